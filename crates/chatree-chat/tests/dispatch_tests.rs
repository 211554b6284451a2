use std::sync::Arc;
use std::time::Duration;

use chatree_chat::{ChatOptions, Dispatcher, Exchange, SendEvent, SubmissionId, TreeChatbot};
use chatree_llm::{ChatMessage, Completion, CompletionClient, EchoClient, LlmError};
use chatree_tree::NodeId;
use futures::future::{BoxFuture, FutureExt};
use tokio::sync::mpsc::UnboundedReceiver;

struct FailingClient;

impl CompletionClient for FailingClient {
    fn create_completion<'a>(
        &'a self,
        _messages: Vec<ChatMessage>,
        _model: &'a str,
    ) -> BoxFuture<'a, Result<Completion, LlmError>> {
        futures::future::ready(Err(LlmError::EmptyCompletion)).boxed()
    }
}

async fn until_terminal(rx: &mut UnboundedReceiver<SendEvent>) -> Vec<SendEvent> {
    let mut events = Vec::new();
    while let Some(event) = tokio::time::timeout(Duration::from_secs(5), rx.recv())
        .await
        .expect("send finished in time")
    {
        let done = event.is_terminal();
        events.push(event);
        if done {
            break;
        }
    }
    events
}

#[tokio::test]
async fn test_send_streams_deltas_then_finishes() {
    let (mut dispatcher, mut rx) = Dispatcher::new(Arc::new(EchoClient::instant()), "echo");
    let id = SubmissionId::new();
    dispatcher.send(id, vec![ChatMessage::user("hello world")]);
    assert!(dispatcher.is_in_flight(id));

    let events = until_terminal(&mut rx).await;
    let streamed: String = events
        .iter()
        .filter_map(|event| match event {
            SendEvent::Delta { text, .. } => Some(text.as_str()),
            _ => None,
        })
        .collect();
    assert_eq!(streamed, "(turn 1) you said: hello world");
    assert_eq!(
        events.last(),
        Some(&SendEvent::Finished {
            id,
            answer: "(turn 1) you said: hello world".into()
        })
    );
    assert!(events.iter().all(|event| event.id() == id));

    dispatcher.settle(id);
    assert_eq!(dispatcher.in_flight(), 0);
}

#[tokio::test]
async fn test_client_error_becomes_failed_event() {
    let (mut dispatcher, mut rx) = Dispatcher::new(Arc::new(FailingClient), "broken");
    let id = SubmissionId::new();
    dispatcher.send(id, vec![ChatMessage::user("hi")]);
    let events = until_terminal(&mut rx).await;
    assert!(matches!(events.as_slice(), [SendEvent::Failed { id: failed, .. }] if *failed == id));
}

#[tokio::test]
async fn test_cancel_stops_the_send() {
    let slow = EchoClient {
        delay: Duration::from_secs(30),
        stream: true,
    };
    let (mut dispatcher, mut rx) = Dispatcher::new(Arc::new(slow), "echo");
    let id = SubmissionId::new();
    dispatcher.send(id, vec![ChatMessage::user("take your time")]);
    assert!(dispatcher.cancel(id));
    assert!(!dispatcher.cancel(id));
    assert_eq!(dispatcher.in_flight(), 0);

    let next = tokio::time::timeout(Duration::from_millis(200), rx.recv()).await;
    assert!(next.is_err() || matches!(next, Ok(None)));
}

#[tokio::test]
async fn test_two_forms_send_concurrently() {
    let mut bot = TreeChatbot::new(None, ChatOptions::default());
    let first = NodeId::from_positions(&[0]);
    let second = NodeId::from_positions(&[1]);
    bot.add_node(&first).unwrap();
    bot.add_node(&second).unwrap();
    bot.form_mut(&first).unwrap().insert_str("one");
    bot.form_mut(&second).unwrap().insert_str("two");

    let (mut dispatcher, mut rx) = Dispatcher::new(Arc::new(EchoClient::instant()), "echo");
    for path in [&first, &second] {
        let submission = bot.submit(path).unwrap();
        dispatcher.send(submission.id, submission.messages());
    }
    assert_eq!(dispatcher.in_flight(), 2);

    while dispatcher.in_flight() > 0 {
        let event = tokio::time::timeout(Duration::from_secs(5), rx.recv())
            .await
            .expect("event in time")
            .expect("channel open");
        match event {
            SendEvent::Delta { id, text } => {
                bot.apply_delta(id, &text);
            }
            SendEvent::Finished { id, answer } => {
                dispatcher.settle(id);
                bot.complete(id, answer).unwrap();
            }
            SendEvent::Failed { id, error } => panic!("send {id} failed: {error}"),
        }
    }

    let children = &bot.root().children;
    assert_eq!(children[0].message, Some(Exchange::new("one", "(turn 1) you said: one")));
    assert_eq!(children[1].message, Some(Exchange::new("two", "(turn 1) you said: two")));
    assert!(children[2].is_add());
}
