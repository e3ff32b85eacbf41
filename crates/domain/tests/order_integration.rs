//! Integration tests for the Order aggregate.
//!
//! These tests exercise the public API the way the application layer uses it:
//! raw input through the factories, commands, event draining, and the
//! record round trip used by persistence.

use domain::{
    AggregateId, AggregateRoot, CustomerId, DomainEvent, Order, OrderError, OrderEvent, OrderItem,
    OrderItemRecord, OrderRecord, OrderState, ValidationError,
};

const ORDER_ID: &str = "11111111-1111-1111-1111-111111111111";
const CUSTOMER_ID: &str = "22222222-2222-2222-2222-222222222222";

fn pending_record() -> OrderRecord {
    OrderRecord {
        id: ORDER_ID.to_string(),
        customer_id: CUSTOMER_ID.to_string(),
        order_items: vec![
            OrderItemRecord {
                article_no: "A-1".to_string(),
                quantity: 1,
            },
            OrderItemRecord {
                article_no: "B-22".to_string(),
                quantity: 100,
            },
        ],
        state: OrderState::Pending.code(),
    }
}

mod factories {
    use super::*;

    #[test]
    fn invalid_quantities_never_produce_an_item() {
        for quantity in [i64::MIN, -1, 0, 101, 1_000] {
            assert!(
                matches!(
                    OrderItem::new("SKU-001", quantity),
                    Err(ValidationError::InvalidQuantity { .. })
                ),
                "quantity {quantity} should be rejected"
            );
        }
    }

    #[test]
    fn invalid_article_numbers_never_produce_an_item() {
        for article_no in ["", "123456789", "TOO-LONG-ARTICLE"] {
            assert!(
                matches!(
                    OrderItem::new(article_no, 1),
                    Err(ValidationError::InvalidArticleNo { .. })
                ),
                "article number {article_no:?} should be rejected"
            );
        }
    }

    #[test]
    fn reconstitute_rejects_out_of_range_quantity() {
        for quantity in [0, 101] {
            let mut record = pending_record();
            record.order_items[0].quantity = quantity;
            assert!(matches!(
                Order::try_from(record),
                Err(ValidationError::InvalidQuantity { .. })
            ));
        }
    }

    #[test]
    fn reconstitute_rejects_bad_article_number() {
        let mut record = pending_record();
        record.order_items[1].article_no = String::new();
        assert!(matches!(
            Order::try_from(record),
            Err(ValidationError::InvalidArticleNo { .. })
        ));
    }

    #[test]
    fn reconstitute_rejects_malformed_identifiers() {
        let mut record = pending_record();
        record.id = "1111".to_string();
        assert!(matches!(
            Order::try_from(record),
            Err(ValidationError::InvalidIdentifier { .. })
        ));
    }
}

mod round_trip {
    use super::*;

    #[test]
    fn reconstitute_then_read_back_yields_inputs() {
        let id = AggregateId::parse(ORDER_ID).unwrap();
        let customer_id = CustomerId::parse(CUSTOMER_ID).unwrap();
        let items = vec![
            OrderItem::new("A-1", 1).unwrap(),
            OrderItem::new("B-22", 100).unwrap(),
        ];

        let order = Order::reconstitute(id, customer_id, items.clone(), OrderState::Submitted);

        assert_eq!(order.id(), id);
        assert_eq!(order.customer_id(), customer_id);
        assert_eq!(order.order_items(), items);
        assert_eq!(order.state(), OrderState::Submitted);
    }

    #[test]
    fn mutating_returned_items_does_not_leak_into_order() {
        let order = Order::try_from(pending_record()).unwrap();

        let mut items = order.order_items();
        items.truncate(0);

        assert_eq!(order.item_count(), 2);
        assert_eq!(order.order_items().len(), 2);
    }

    #[test]
    fn record_survives_json_round_trip() {
        let order = Order::try_from(pending_record()).unwrap();
        let json = serde_json::to_string(&order.to_record()).unwrap();
        let decoded: OrderRecord = serde_json::from_str(&json).unwrap();
        let restored = Order::try_from(decoded).unwrap();

        assert_eq!(restored, order);
        assert_eq!(restored.order_items(), order.order_items());
        assert_eq!(restored.state(), order.state());
    }
}

mod lifecycle {
    use super::*;

    #[test]
    fn submit_then_submit_again() {
        let mut order = Order::try_from(pending_record()).unwrap();

        order.submit().unwrap();
        let second = order.submit();

        assert!(matches!(
            second,
            Err(OrderError::InvalidStateTransition {
                current_state: OrderState::Submitted,
                ..
            })
        ));
        assert_eq!(order.state(), OrderState::Submitted);
        assert_eq!(order.take_events().len(), 1);
    }

    #[test]
    fn cancel_on_submitted_order_fails() {
        let mut record = pending_record();
        record.state = OrderState::Submitted.code();
        let mut order = Order::try_from(record).unwrap();

        assert!(order.cancel().is_err());
        assert_eq!(order.state(), OrderState::Submitted);
        assert!(order.pending_events().is_empty());
    }

    #[test]
    fn reconstituted_cancelled_order_rejects_all_commands() {
        let mut record = pending_record();
        record.state = OrderState::Cancelled.code();
        let mut order = Order::try_from(record).unwrap();

        assert!(order.submit().is_err());
        assert!(order.cancel().is_err());
        assert!(order.take_events().is_empty());
    }

    fn drained_kinds<A: AggregateRoot>(aggregate: &mut A) -> Vec<&'static str> {
        aggregate
            .take_events()
            .iter()
            .map(|event| event.event_type())
            .collect()
    }

    #[test]
    fn order_is_drained_through_the_aggregate_root_trait() {
        let mut order = Order::try_from(pending_record()).unwrap();
        order.cancel().unwrap();

        assert_eq!(drained_kinds(&mut order), vec![OrderEvent::CANCEL]);
        assert!(drained_kinds(&mut order).is_empty());
        assert_eq!(order.id().to_string(), ORDER_ID);
    }

    #[test]
    fn events_carry_order_and_customer() {
        let mut order = Order::try_from(pending_record()).unwrap();
        order.submit().unwrap();

        let events = AggregateRoot::take_events(&mut order);
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].event_type(), OrderEvent::SUBMIT);
        match &events[0] {
            OrderEvent::Submitted(data) => {
                assert_eq!(data.order_id.to_string(), ORDER_ID);
                assert_eq!(data.customer_id.to_string(), CUSTOMER_ID);
            }
            other => panic!("expected Submitted event, got {other:?}"),
        }
    }
}
