use twirl_domain::{DnsQuestion, Event, ShutdownSignal};

#[test]
fn test_status_events_with_same_text_are_equal_values() {
    let a = Event::status("Heartbeat on control channel");
    let b = Event::status(String::from("Heartbeat on control channel"));
    assert_eq!(a, b);
}

#[test]
fn test_signal_names() {
    assert_eq!(ShutdownSignal::Interrupt.to_string(), "SIGINT");
    assert_eq!(ShutdownSignal::Terminate.to_string(), "SIGTERM");
    assert_eq!(ShutdownSignal::Quit.to_string(), "SIGQUIT");
}

#[test]
fn test_dns_question_display() {
    let q = DnsQuestion::new("example.com.", "A", "IN");
    assert_eq!(q.to_string(), "example.com. IN A");
}
