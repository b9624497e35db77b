use sim_logger::{LevelFilter, Logger, LoggerError};

#[test]
fn second_init_is_a_subscriber_error() {
    let _logger = Logger::builder()
        .name("sim-first")
        .level(LevelFilter::INFO)
        .init()
        .expect("first init should succeed");

    let err = Logger::builder()
        .name("sim-second")
        .level(LevelFilter::INFO)
        .init()
        .expect_err("second init should fail");

    assert!(matches!(err, LoggerError::Subscriber { .. }), "got {err}");
}
