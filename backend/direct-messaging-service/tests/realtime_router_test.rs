//! Router behaviour under concurrent joins, routes and leaves
use direct_messaging_service::websocket::{
    message_types::{EncryptionStatusEvent, MessageEvent},
    DeliveryChannel, RealtimeRouter, RoutedEvent,
};
use crypto_core::EncryptedFields;
use uuid::Uuid;

fn message(sender_id: Uuid, recipient_id: Uuid, n: usize) -> RoutedEvent {
    RoutedEvent::Message(MessageEvent {
        sender_id,
        recipient_id,
        message_id: None,
        fields: EncryptedFields {
            ciphertext_hex: format!("{n:08x}"),
            iv_hex: "00".repeat(16),
            salt_hex: "11".repeat(32),
            auth_tag_hex: "22".repeat(16),
        },
    })
}

#[tokio::test]
async fn test_payload_is_delivered_verbatim() {
    let router = RealtimeRouter::new();
    let (me, peer) = (Uuid::new_v4(), Uuid::new_v4());
    let (channel, mut rx) = DeliveryChannel::open();
    router.join(&channel, me).await;

    let event = RoutedEvent::EncryptionStatus(EncryptionStatusEvent {
        sender_id: peer,
        recipient_id: me,
        status: "key_rotated".into(),
    });
    router.route(&event).await;

    let received: RoutedEvent = serde_json::from_str(&rx.recv().await.unwrap()).unwrap();
    assert_eq!(received, event);
}

#[tokio::test]
async fn test_order_preserved_for_a_single_sender() {
    let router = RealtimeRouter::new();
    let (me, peer) = (Uuid::new_v4(), Uuid::new_v4());
    let (channel, mut rx) = DeliveryChannel::open();
    router.join(&channel, me).await;

    for n in 0..100 {
        router.route(&message(peer, me, n)).await;
    }

    for n in 0..100 {
        let received: RoutedEvent = serde_json::from_str(&rx.recv().await.unwrap()).unwrap();
        assert_eq!(received, message(peer, me, n));
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_join_route_leave() {
    let router = RealtimeRouter::new();
    let user = Uuid::new_v4();

    // A stable channel that stays joined throughout
    let (stable, mut stable_rx) = DeliveryChannel::open();
    router.join(&stable, user).await;

    let mut tasks = Vec::new();
    for _ in 0..16 {
        let router = router.clone();
        tasks.push(tokio::spawn(async move {
            for _ in 0..25 {
                let (channel, _rx) = DeliveryChannel::open();
                router.join(&channel, user).await;
                router.leave(channel.id()).await;
            }
        }));
    }
    let sender = {
        let router = router.clone();
        tokio::spawn(async move {
            for n in 0..200 {
                assert!(router.route(&message(Uuid::new_v4(), user, n)).await >= 1);
            }
        })
    };

    for task in tasks {
        task.await.unwrap();
    }
    sender.await.unwrap();

    assert_eq!(router.subscriber_count(user).await, 1);
    let mut received = 0;
    while stable_rx.try_recv().is_ok() {
        received += 1;
    }
    assert_eq!(received, 200);
}
