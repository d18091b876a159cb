mod common;

use common::{period, Fixture, RecordingRemote};
use envelope_budget::{
    config::{ConcurrencyMode, Config},
    engine::ConcurrencyPolicy,
    SessionError,
};
use rust_decimal_macros::dec;

#[test]
fn load_json_replaces_local_state() {
    let fx = Fixture::new();
    fx.seed(dec!(1), vec![fx.balance(fx.rent, dec!(5), dec!(5))]);

    let payload = format!(
        r#"{{
            "ready_to_assign": "412.50",
            "balances": [
                {{
                    "category_id": "{groceries}",
                    "budget_id": "{budget}",
                    "year": {year},
                    "month": {month},
                    "assigned": 300,
                    "activity": -120,
                    "available": 180,
                    "is_optimistic": true
                }}
            ]
        }}"#,
        groceries = fx.groceries,
        budget = fx.budget_id,
        year = period().year(),
        month = period().month(),
    );
    fx.session.load_json(&payload).expect("load payload");

    assert_eq!(fx.store().ready_to_assign(), dec!(412.50));
    assert!(fx.store().get_balance(fx.rent).is_none());
    let groceries = fx.store().get_balance(fx.groceries).expect("groceries");
    assert_eq!(groceries.available, dec!(180));
    assert!(!groceries.is_optimistic);
}

#[test]
fn load_json_rejects_malformed_payload() {
    let fx = Fixture::new();
    fx.seed(dec!(7), Vec::new());

    let err = fx
        .session
        .load_json(r#"{ "balances": 12 }"#)
        .expect_err("malformed payload");
    assert!(matches!(err, SessionError::Decode(_)));
    assert_eq!(fx.store().ready_to_assign(), dec!(7));
}

#[tokio::test]
async fn session_built_from_config_file_applies_policy() {
    let config = Config {
        concurrency: ConcurrencyMode::Queue,
        ..Config::default()
    };
    let fx = Fixture::from_config_file(&config);
    assert_eq!(fx.session.options().concurrency, ConcurrencyPolicy::Queue);
    assert!(fx.session.options().serialize_budget);

    fx.seed(dec!(40), Vec::new());
    let remote = RecordingRemote::echo();
    fx.session
        .pull_from_ready_to_assign(fx.vacation, dec!(40), &remote)
        .await
        .expect("pull");
    assert_eq!(fx.store().totals().total_assigned, dec!(40));
}

#[test]
fn core_errors_convert_into_session_errors() {
    let err: SessionError = envelope_budget::engine::CoreError::MutationInFlight(
        envelope_budget::engine::MutationKind::UpdateAssigned,
    )
    .into();
    assert_eq!(err.to_string(), "Another update assigned request is already in flight");
}
