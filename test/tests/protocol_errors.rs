/// Malformed or out-of-contract messages are rejected with an error rather
/// than applied.

use serde_json::json;

use shadow_sync_data::DataChannelError;
use shadow_sync_shared::{
    CallbackId, DataMessage, NodeId, ProtocolError, QueuePublisher, ViewMessage, WireMessage,
};
use shadow_sync_test::{Harness, MemoryBackend};
use shadow_sync_view::{MessageChannelViewSide, ViewError};

fn view_side() -> MessageChannelViewSide<MemoryBackend> {
    let _ = env_logger::builder().is_test(true).try_init();
    MessageChannelViewSide::new(
        MemoryBackend::new(),
        Box::new(QueuePublisher::new()),
        &Default::default(),
    )
}

#[test]
fn unknown_opcode_is_rejected_by_both_sides() {
    let mut view = view_side();
    let message = WireMessage::new(vec![json!(250)]);
    assert!(matches!(
        view.receive(&message),
        Err(ViewError::Protocol(ProtocolError::UnknownOpcode { .. }))
    ));

    let mut harness = Harness::new();
    assert!(matches!(
        harness.data.receive(&message),
        Err(DataChannelError::Protocol(ProtocolError::UnknownOpcode { .. }))
    ));
}

#[test]
fn commands_on_unknown_nodes_fail() {
    let mut view = view_side();
    let message = DataMessage::SetId {
        node: NodeId::new(42),
        id: "x".to_string(),
    };
    assert_eq!(
        view.receive(&message.to_wire()),
        Err(ViewError::UnknownNode {
            node: NodeId::new(42)
        })
    );
}

#[test]
fn fragments_cannot_be_used_as_nodes() {
    let mut view = view_side();
    view.receive(&DataMessage::CreateFragment { id: NodeId::new(1) }.to_wire())
        .unwrap();
    let result = view.receive(
        &DataMessage::SetId {
            node: NodeId::new(1),
            id: "x".to_string(),
        }
        .to_wire(),
    );
    assert!(matches!(result, Err(ViewError::WrongEntryKind { .. })));
}

#[test]
fn model_binding_without_listener_is_refused() {
    let mut view = view_side();
    view.receive(
        &DataMessage::CreateElement {
            id: NodeId::new(1),
            logical_name: "input".to_string(),
            styling_name: "input".to_string(),
            owner: None,
        }
        .to_wire(),
    )
    .unwrap();

    let result = view.receive(
        &DataMessage::SetModelBindingStat {
            node: NodeId::new(1),
            attribute: "value".to_string(),
            listener: None,
        }
        .to_wire(),
    );
    assert_eq!(
        result,
        Err(ViewError::MissingModelBindingListener {
            node: NodeId::new(1),
            attribute: "value".to_string(),
        })
    );
}

#[test]
fn reply_to_an_unknown_callback_fails() {
    let mut harness = Harness::new();
    let reply = ViewMessage::GetContextCallback {
        callback: CallbackId::new(99),
        context: json!(null),
    };
    assert_eq!(
        harness.data.receive(&reply.to_wire()),
        Err(DataChannelError::UnknownCallback {
            callback: CallbackId::new(99)
        })
    );
}

#[test]
fn reply_of_the_wrong_kind_fails() {
    let mut harness = Harness::new();
    // the first callback issued is the environment request
    let reply = ViewMessage::RenderCallback {
        callback: CallbackId::new(1),
        error: None,
    };
    assert!(matches!(
        harness.data.receive(&reply.to_wire()),
        Err(DataChannelError::CallbackKindMismatch { .. })
    ));
}
