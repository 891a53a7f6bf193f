use shared::domain::TeacherId;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    TeacherList,
    TeacherAdd,
    TeacherEdit(TeacherId),
    TeacherGroups(String),
}

impl Route {
    pub fn path(&self) -> String {
        match self {
            Route::TeacherList => "/teachers".to_string(),
            Route::TeacherAdd => "/teachers/add".to_string(),
            Route::TeacherEdit(id) => format!("/teachers/edit/{}", id.0),
            Route::TeacherGroups(key) => format!("/teachers/teacherGroups/{key}"),
        }
    }
}

/// Router seam used for post-action redirects.
pub trait Navigator: Send + Sync {
    fn navigate(&self, path: &str);
}

pub fn go(navigator: &dyn Navigator, route: &Route) {
    tracing::debug!(path = %route.path(), "navigation: redirect");
    navigator.navigate(&route.path());
}
