use super::*;
use std::time::Duration;
use tokio::sync::{mpsc, oneshot};

type Reply = oneshot::Sender<ClientResult<PageResult<u32>>>;

struct PendingCall {
    request: PageRequest,
    reply: Reply,
}

/// Page source whose calls are answered by the test, in any order.
struct ScriptedSource {
    calls: mpsc::UnboundedSender<PendingCall>,
}

#[async_trait]
impl PageSource<u32> for ScriptedSource {
    async fn fetch_page(&self, request: &PageRequest) -> ClientResult<PageResult<u32>> {
        let (reply, rx) = oneshot::channel();
        self.calls
            .send(PendingCall {
                request: request.clone(),
                reply,
            })
            .map_err(|_| ClientError::NetworkFailure("script closed".into()))?;
        rx.await
            .unwrap_or_else(|_| Err(ClientError::NetworkFailure("reply dropped".into())))
    }
}

fn scripted(
    request: PageRequest,
) -> (
    PaginatedFetchController<u32>,
    mpsc::UnboundedReceiver<PendingCall>,
) {
    let (tx, rx) = mpsc::unbounded_channel();
    let controller = PaginatedFetchController::spawn(Arc::new(ScriptedSource { calls: tx }), request);
    (controller, rx)
}

async fn next_call(rx: &mut mpsc::UnboundedReceiver<PendingCall>) -> PendingCall {
    tokio::time::timeout(Duration::from_secs(2), rx.recv())
        .await
        .expect("fetch should be issued")
        .expect("source alive")
}

fn page(items: Vec<u32>, total_pages: u32) -> ClientResult<PageResult<u32>> {
    Ok(PageResult { items, total_pages })
}

#[test]
fn query_sends_search_value_only_for_non_blank_terms() {
    let blank = PageRequest::new("   ", 10).to_query();
    assert_eq!(blank.value, None);
    assert_eq!((blank.page, blank.page_size), (1, 10));

    let term = PageRequest::new("  ana ", 5).with_page(3).to_query();
    assert_eq!(term.value.as_deref(), Some("ana"));
    assert_eq!((term.page, term.page_size), (3, 5));
}

#[tokio::test]
async fn first_fetch_loads_then_commits_page() {
    let (controller, mut calls) = scripted(PageRequest::new("", 2));

    let call = next_call(&mut calls).await;
    assert_eq!(call.request, PageRequest::new("", 2));
    assert!(controller.snapshot().loading);

    call.reply.send(page(vec![1, 2], 4)).expect("reply");
    let state = controller.settled().await;
    assert_eq!(state.data, vec![1, 2]);
    assert_eq!(state.total_pages, 4);
    assert!(state.error.is_none());
}

#[tokio::test]
async fn out_of_order_responses_never_overwrite_newer_request() {
    let (controller, mut calls) = scripted(PageRequest::new("a", 10));
    let first = next_call(&mut calls).await;

    assert!(controller.set_search_term("ab"));
    let second = next_call(&mut calls).await;
    assert_eq!(second.request.search_term, "ab");

    second.reply.send(page(vec![2], 1)).expect("reply");
    // The superseded fetch was aborted; its reply may have nowhere to go.
    let _ = first.reply.send(page(vec![1], 1));

    let state = controller.settled().await;
    assert_eq!(state.data, vec![2]);
    assert_eq!(state.request.search_term, "ab");

    tokio::time::sleep(Duration::from_millis(20)).await;
    assert_eq!(controller.snapshot().data, vec![2]);
}

#[tokio::test]
async fn commit_with_superseded_generation_is_discarded() {
    let (controller, mut calls) = scripted(PageRequest::new("", 10));
    let call = next_call(&mut calls).await;
    call.reply.send(page(vec![7], 1)).expect("reply");
    let settled = controller.settled().await;

    controller
        .shared
        .commit(settled.generation() - 1, page(vec![99], 9));

    let state = controller.snapshot();
    assert_eq!(state.data, vec![7]);
    assert_eq!(state.total_pages, 1);
}

#[tokio::test]
async fn search_change_restarts_from_first_page_in_a_single_fetch() {
    let (controller, mut calls) = scripted(PageRequest::new("", 10));
    next_call(&mut calls)
        .await
        .reply
        .send(page(vec![1], 5))
        .expect("reply");
    controller.settled().await;

    assert!(controller.set_page(3));
    let paged = next_call(&mut calls).await;
    assert_eq!(paged.request.page, 3);
    paged.reply.send(page(vec![3], 5)).expect("reply");
    controller.settled().await;

    assert!(controller.set_search_term("maria"));
    let searched = next_call(&mut calls).await;
    assert_eq!(searched.request.page, 1);
    assert_eq!(searched.request.search_term, "maria");
    assert!(calls.try_recv().is_err(), "only one fetch per search change");
}

#[tokio::test]
async fn set_page_clamps_into_known_range() {
    let (controller, mut calls) = scripted(PageRequest::new("", 10));
    next_call(&mut calls)
        .await
        .reply
        .send(page(vec![1], 3))
        .expect("reply");
    controller.settled().await;

    assert!(controller.set_page(10));
    let call = next_call(&mut calls).await;
    assert_eq!(call.request.page, 3);
    call.reply.send(page(vec![3], 3)).expect("reply");
    controller.settled().await;

    assert!(!controller.set_page(3), "unchanged request does not refetch");
    assert!(controller.set_page(0));
    assert_eq!(next_call(&mut calls).await.request.page, 1);
}

#[tokio::test]
async fn failure_keeps_previous_rows_and_reports_error() {
    let (controller, mut calls) = scripted(PageRequest::new("", 10));
    next_call(&mut calls)
        .await
        .reply
        .send(page(vec![1, 2], 2))
        .expect("reply");
    controller.settled().await;

    controller.refresh();
    next_call(&mut calls)
        .await
        .reply
        .send(Err(ClientError::HttpError {
            status: 500,
            message: "boom".into(),
        }))
        .expect("reply");

    let state = controller.settled().await;
    assert!(!state.loading);
    assert_eq!(state.data, vec![1, 2]);
    assert!(matches!(
        state.error,
        Some(ClientError::HttpError { status: 500, .. })
    ));
    assert!(state.error_message().expect("message").contains("500"));
}

#[tokio::test]
async fn refresh_reissues_the_same_request_and_clears_error() {
    let (controller, mut calls) = scripted(PageRequest::new("x", 4));
    next_call(&mut calls)
        .await
        .reply
        .send(Err(ClientError::NetworkFailure("down".into())))
        .expect("reply");
    assert!(controller.settled().await.error.is_some());

    controller.refresh();
    assert!(controller.snapshot().error.is_none());
    let again = next_call(&mut calls).await;
    assert_eq!(again.request, PageRequest::new("x", 4));
    again.reply.send(page(vec![4], 1)).expect("reply");
    assert_eq!(controller.settled().await.data, vec![4]);
}

#[tokio::test]
async fn cancelled_fetch_is_never_applied() {
    let (controller, mut calls) = scripted(PageRequest::new("", 10));
    let pending = next_call(&mut calls).await;

    controller.cancel();
    assert!(!controller.snapshot().loading);
    let _ = pending.reply.send(page(vec![5], 1));

    tokio::time::sleep(Duration::from_millis(20)).await;
    assert!(controller.snapshot().data.is_empty());
}

#[tokio::test]
async fn shrinking_result_moves_back_to_last_page() {
    let (controller, mut calls) = scripted(PageRequest::new("", 1));
    next_call(&mut calls)
        .await
        .reply
        .send(page(vec![1], 3))
        .expect("reply");
    controller.settled().await;
    assert!(controller.set_page(3));
    next_call(&mut calls)
        .await
        .reply
        .send(page(vec![3], 3))
        .expect("reply");
    controller.settled().await;

    controller.refresh();
    next_call(&mut calls)
        .await
        .reply
        .send(page(Vec::new(), 2))
        .expect("reply");

    let clamped = next_call(&mut calls).await;
    assert_eq!(clamped.request.page, 2);
    clamped.reply.send(page(vec![2], 2)).expect("reply");
    let state = controller.settled().await;
    assert_eq!(state.request.page, 2);
    assert_eq!(state.data, vec![2]);
}
