use chatree_chat::{
    normalize, ChatAction, ChatError, ChatOptions, Exchange, FailurePolicy, MessageTreeNode,
    TreeChatbot,
};
use chatree_llm::ChatMessage;
use chatree_tree::{NodeId, TreeEvent};

fn p(positions: &[usize]) -> NodeId {
    NodeId::from_positions(positions)
}

fn type_into(bot: &mut TreeChatbot, path: &NodeId, text: &str) {
    bot.form_mut(path).expect("open form").insert_str(text);
}

// ─── Normalization ──────────────────────────────────────────────

#[test]
fn test_empty_tree_normalizes_to_single_sentinel() {
    let bot = TreeChatbot::new(None, ChatOptions::default());
    let root = bot.root();
    assert!(root.message.is_none());
    assert_eq!(root.children.len(), 1);
    assert!(root.children[0].is_add());
}

#[test]
fn test_normalize_is_idempotent() {
    let root = MessageTreeNode::default()
        .with_child(
            MessageTreeNode::with_message(Exchange::new("q1", "a1"))
                .with_child(MessageTreeNode::with_message(Exchange::new("q2", "a2"))),
        )
        .with_child(MessageTreeNode::add_sentinel())
        .with_child(MessageTreeNode::add_sentinel());
    let once = normalize(Some(root));
    let twice = normalize(Some(once.clone()));
    assert_eq!(once, twice);
    assert_eq!(once.children.len(), 2);
    assert_eq!(once.children[0].children.len(), 2);
    assert!(once.children[0].children[0].children[0].is_add());
}

// ─── Open, submit, complete ─────────────────────────────────────

#[test]
fn test_sentinel_opens_submits_and_completes() {
    let mut bot = TreeChatbot::new(None, ChatOptions::default());

    let action = bot.activate(&p(&[0])).unwrap();
    assert_eq!(action, Some(ChatAction::OpenedForm(p(&[0]))));
    assert!(bot.form(&p(&[0])).is_some());
    assert!(bot.root().children[1].is_add());

    type_into(&mut bot, &p(&[0]), "hello");
    let submission = bot.submit(&p(&[0])).unwrap();
    assert_eq!(submission.query, "hello");
    assert!(submission.history.is_empty());
    assert_eq!(submission.messages(), vec![ChatMessage::user("hello")]);

    assert!(bot.apply_delta(submission.id, "hi "));
    assert!(bot.apply_delta(submission.id, "there"));
    assert_eq!(
        bot.pending(submission.id).map(|p| p.answer.as_str()),
        Some("hi there")
    );

    let path = bot.complete(submission.id, "hi there".into()).unwrap();
    assert_eq!(path, p(&[0]));
    let root = bot.root();
    assert_eq!(root.children[0].message, Some(Exchange::new("hello", "hi there")));
    assert!(root.children[0].state.is_none());
    assert!(root.children[0].children[0].is_add());
    assert!(root.children[1].is_add());
    assert_eq!(root.children.len(), 2);
}

#[test]
fn test_history_follows_the_branch() {
    let root = MessageTreeNode::default().with_child(
        MessageTreeNode::with_message(Exchange::new("q1", "a1"))
            .with_child(MessageTreeNode::with_message(Exchange::new("q2", "a2"))),
    );
    let mut bot = TreeChatbot::new(Some(root), ChatOptions::default());
    // [0, 0] is q2; its sentinel sits at [0, 0, 0].
    bot.activate(&p(&[0, 0, 0])).unwrap();
    type_into(&mut bot, &p(&[0, 0, 0]), "q3");
    let submission = bot.submit(&p(&[0, 0, 0])).unwrap();
    assert_eq!(
        submission.messages(),
        vec![
            ChatMessage::user("q1"),
            ChatMessage::assistant("a1"),
            ChatMessage::user("q2"),
            ChatMessage::assistant("a2"),
            ChatMessage::user("q3"),
        ]
    );
}

#[test]
fn test_submit_rejects_empty_and_latched_forms() {
    let mut bot = TreeChatbot::new(None, ChatOptions::default());
    bot.activate(&p(&[0])).unwrap();
    assert_eq!(bot.submit(&p(&[0])), Err(ChatError::EmptyInput));

    type_into(&mut bot, &p(&[0]), "once");
    bot.submit(&p(&[0])).unwrap();
    assert_eq!(
        bot.submit(&p(&[0])),
        Err(ChatError::AlreadySubmitting(p(&[0])))
    );
}

// ─── Per-form latches ───────────────────────────────────────────

#[test]
fn test_sibling_forms_do_not_share_submission_state() {
    let mut bot = TreeChatbot::new(None, ChatOptions::default());
    bot.add_node(&p(&[0])).unwrap();
    bot.add_node(&p(&[1])).unwrap();
    assert!(bot.form(&p(&[0])).is_some());
    assert!(bot.form(&p(&[1])).is_some());

    type_into(&mut bot, &p(&[0]), "first");
    type_into(&mut bot, &p(&[1]), "second");
    let submission = bot.submit(&p(&[1])).unwrap();

    let first = bot.form(&p(&[0])).unwrap();
    assert!(!first.is_submitting());
    assert_eq!(first.input(), "first");
    assert!(bot.form(&p(&[1])).unwrap().is_submitting());

    bot.complete(submission.id, "answer".into()).unwrap();
    let first = bot.form(&p(&[0])).unwrap();
    assert!(!first.is_submitting());
    assert_eq!(first.input(), "first");
    assert_eq!(
        bot.root().children[1].message,
        Some(Exchange::new("second", "answer"))
    );
}

#[test]
fn test_completion_finds_form_after_siblings_shift() {
    let mut bot = TreeChatbot::new(None, ChatOptions::default());
    bot.activate(&p(&[0])).unwrap();
    type_into(&mut bot, &p(&[0]), "slow");
    let submission = bot.submit(&p(&[0])).unwrap();

    // Inserting before the pending form moves it to [1].
    bot.add_node(&p(&[0])).unwrap();
    assert_eq!(bot.find_submission(submission.id), Some(p(&[1])));

    let path = bot.complete(submission.id, "done".into()).unwrap();
    assert_eq!(path, p(&[1]));
    assert!(bot.form(&p(&[0])).is_some());
    assert_eq!(
        bot.root().children[1].message,
        Some(Exchange::new("slow", "done"))
    );
}

// ─── Cancel and failure ─────────────────────────────────────────

#[test]
fn test_cancel_reports_in_flight_send() {
    let mut bot = TreeChatbot::new(None, ChatOptions::default());
    bot.activate(&p(&[0])).unwrap();
    type_into(&mut bot, &p(&[0]), "never mind");
    let submission = bot.submit(&p(&[0])).unwrap();

    assert_eq!(bot.cancel(&p(&[0])).unwrap(), Some(submission.id));
    assert_eq!(bot.root().children.len(), 1);
    assert!(bot.root().children[0].is_add());
    assert!(!bot.apply_delta(submission.id, "late"));
    assert_eq!(
        bot.complete(submission.id, "late".into()),
        Err(ChatError::UnknownSubmission(submission.id))
    );
}

#[test]
fn test_failure_keeps_form_by_default() {
    let mut bot = TreeChatbot::new(None, ChatOptions::default());
    bot.activate(&p(&[0])).unwrap();
    type_into(&mut bot, &p(&[0]), "retry me");
    let submission = bot.submit(&p(&[0])).unwrap();

    bot.fail(submission.id).unwrap();
    let form = bot.form(&p(&[0])).unwrap();
    assert!(!form.is_submitting());
    assert_eq!(form.input(), "retry me");
}

#[test]
fn test_failure_can_revert_to_sentinel() {
    let options = ChatOptions {
        failure_policy: FailurePolicy::RevertToSentinel,
    };
    let mut bot = TreeChatbot::new(None, options);
    bot.activate(&p(&[0])).unwrap();
    type_into(&mut bot, &p(&[0]), "oops");
    let submission = bot.submit(&p(&[0])).unwrap();

    bot.fail(submission.id).unwrap();
    assert_eq!(bot.root().children.len(), 1);
    assert!(bot.root().children[0].is_add());
}

// ─── Events ─────────────────────────────────────────────────────

#[test]
fn test_tree_events_route_to_chat_transitions() {
    let root = MessageTreeNode::default()
        .with_child(MessageTreeNode::with_message(Exchange::new("q", "a")));
    let mut bot = TreeChatbot::new(Some(root), ChatOptions::default());

    let action = bot.handle(&TreeEvent::Activate(p(&[0]))).unwrap();
    assert_eq!(action, Some(ChatAction::Expand(Exchange::new("q", "a"))));

    let action = bot.handle(&TreeEvent::Add(p(&[0]))).unwrap();
    assert_eq!(action, Some(ChatAction::OpenedForm(p(&[0]))));
    assert!(bot.form(&p(&[0])).is_some());
    assert_eq!(bot.root().children[1].message, Some(Exchange::new("q", "a")));
    assert_eq!(bot.activated(), Some(&p(&[0])));
}

#[test]
fn test_set_root_renormalizes_and_clears_activation() {
    let mut bot = TreeChatbot::new(None, ChatOptions::default());
    bot.select(p(&[0]));
    assert_eq!(bot.activated(), Some(&p(&[0])));
    bot.set_root(Some(
        MessageTreeNode::default().with_child(MessageTreeNode::with_message(Exchange::new("x", "y"))),
    ));
    assert_eq!(bot.activated(), None);
    assert!(bot.root().children[0].children[0].is_add());
    assert!(bot.root().children[1].is_add());
}

#[test]
fn test_exchange_on_supplied_root_is_a_visible_turn() {
    let root = MessageTreeNode::with_message(Exchange::new("root q", "root a"));
    let mut bot = TreeChatbot::new(Some(root), ChatOptions::default());
    assert!(bot.root().message.is_none());
    assert_eq!(bot.root().children[0].message, Some(Exchange::new("root q", "root a")));

    // A sibling of the supplied turn starts a fresh branch.
    bot.activate(&p(&[1])).unwrap();
    type_into(&mut bot, &p(&[1]), "fresh");
    assert!(bot.submit(&p(&[1])).unwrap().history.is_empty());

    // Under it, the turn is part of the history.
    bot.activate(&p(&[0, 0])).unwrap();
    type_into(&mut bot, &p(&[0, 0]), "follow up");
    let submission = bot.submit(&p(&[0, 0])).unwrap();
    assert_eq!(submission.history, vec![Exchange::new("root q", "root a")]);
}

#[test]
fn test_add_node_under_sentinel_or_form_is_rejected() {
    let mut bot = TreeChatbot::new(None, ChatOptions::default());
    let before = bot.root().clone();

    let err = bot.add_node(&p(&[0, 0])).unwrap_err();
    assert!(matches!(err, ChatError::NotExpandable(ref parent) if *parent == p(&[0])));
    assert_eq!(bot.root(), &before);
    assert!(bot.activated().is_none());

    bot.activate(&p(&[0])).unwrap();
    let before = bot.root().clone();
    let err = bot.add_node(&p(&[0, 0])).unwrap_err();
    assert!(matches!(err, ChatError::NotExpandable(_)));
    assert_eq!(bot.root(), &before);
    assert!(bot.form(&p(&[0])).is_some());
}
