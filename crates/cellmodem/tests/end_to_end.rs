//! End-to-end flows through the facade: build a channel over a mock
//! transport, identify, bind the vendor driver and run a session.

use cellmodem::cloud;
use cellmodem::timing::no_delay;
use cellmodem::{
    connect, identify, network_info, send_sms, CancellationToken, Error, GnssPoller, ModemBuilder,
    ModemEvent, Pacing, ResultCode, SessionTiming, Vendor,
};
use cellmodem_test_harness::MockTransport;

fn builder() -> ModemBuilder {
    ModemBuilder::new()
        .timing(SessionTiming::immediate())
        .delay(no_delay())
}

#[tokio::test]
async fn quectel_gnss_reading_with_blank_coordinates() {
    let mut mock = MockTransport::new();
    mock.expect_at("ATI", &["Quectel", "EC25", "Revision: EC25EFAR06A06M4G", "OK"]);
    mock.expect_at("AT+QGPSEND", &["OK"]);
    mock.expect_at("AT+QGPSCFG=\"gpsnmeatype\",3", &["OK"]);
    mock.expect_at("AT+QGPSCFG=\"nmeasrc\",1", &["OK"]);
    mock.expect_at("AT+QGPS=1", &["OK"]);
    mock.expect_at("AT+QGPSLOC=?", &["OK"]);
    mock.expect_at(
        "AT+QGPSGNMEA=\"GGA\"",
        &["+QGPSGNMEA: $GPGGA,092204.999,,,,,0,00,,,M,,M,,*55", "OK"],
    );

    let b = builder();
    let channel = b.build_with_transport(Box::new(mock));
    let (ident, mut modem) = connect(channel, b.pacing()).await.unwrap();
    assert_eq!(ident.vendor, Some(Vendor::Quectel));
    assert!(ident.text.contains("EC25"));

    let poller = GnssPoller::new(b.delay_source(), b.session_timing().clone());
    let cancel = CancellationToken::new();
    let stop = cancel.clone();
    let mut events = Vec::new();
    let mut sink = |event: ModemEvent| {
        if matches!(event, ModemEvent::Position(_)) {
            stop.cancel();
        }
        events.push(event);
    };
    poller.run(modem.as_mut(), &cancel, &mut sink).await.unwrap();

    assert_eq!(events.len(), 1);
    match &events[0] {
        ModemEvent::Position(fix) => {
            assert_eq!(fix.time, "09:22:04");
            assert_eq!(fix.latitude, "");
            assert_eq!(fix.longitude, "");
            assert_eq!(fix.error, "No Error");
        }
        other => panic!("unexpected event: {other:?}"),
    }
}

#[tokio::test]
async fn unrecognised_modem_is_unsupported_device() {
    let mut mock = MockTransport::new();
    mock.expect_at("ATI", &["u-blox", "SARA-R410M", "OK"]);

    let b = builder();
    let channel = b.build_with_transport(Box::new(mock));
    match connect(channel, b.pacing()).await {
        Err(Error::UnsupportedDevice(text)) => assert!(text.contains("SARA")),
        Err(e) => panic!("unexpected error: {e}"),
        Ok(_) => panic!("an unknown modem was bound"),
    }
}

#[tokio::test]
async fn network_info_runs_on_unrecognised_modem() {
    let mut mock = MockTransport::new();
    mock.expect_at("ATI", &["u-blox", "OK"]);
    mock.expect_at("AT+COPS?", &["+COPS: 0,0,\"Vodafone\",7", "OK"]);
    mock.expect_at("AT+CREG?", &["+CREG: 0,5", "OK"]);
    mock.expect_at("AT+CSQ", &["+CSQ: 18,99", "OK"]);
    mock.expect_at("AT+CGDCONT?", &["OK"]);
    mock.expect_at("AT+CIPGSMLOC=1,1", &["ERROR"]);
    mock.expect_at("AT+CPSI?", &["ERROR"]);

    let mut channel = builder().build_with_transport(Box::new(mock));
    let ident = identify(&mut channel).await.unwrap();
    assert_eq!(ident.vendor, None);

    let entries = network_info(&mut channel).await.unwrap();
    assert_eq!(entries.len(), 6);
    assert_eq!(entries[0].to_string(), "Operator:\n+COPS: 0,0,\"Vodafone\",7");
    assert_eq!(
        entries[4].to_string(),
        "AT Command: AT+CIPGSMLOC=1,1, status: ERROR"
    );
}

#[tokio::test]
async fn hologram_send_through_quectel() {
    let payload = r#"{"k":"KEY1","d":"hi","t":"TOPIC1"}"#;
    let mut mock = MockTransport::new();
    mock.expect_at("ATI", &["Quectel", "EG95", "OK"]);
    mock.expect_at("AT+QICSGP=1,1,\"hologram\",\"\",\"\",1", &["OK"]);
    mock.expect_at("AT+QIACT=1", &["OK"]);
    mock.expect_at("AT+QIACT?", &["+QIACT: 1,1,1,\"10.1.2.3\"", "OK"]);
    mock.expect_at("AT+QIOPEN=1,0,\"TCP\",\"23.253.146.203\",9999,0,1", &["OK"]);
    mock.expect_at(&format!("AT+QISEND=0,{}", payload.len()), &["> "]);
    mock.expect(payload.as_bytes(), b"\r\nSEND OK\r\n");
    mock.expect_at("AT+QISEND=0,0", &["+QISEND: 34,34,0", "OK"]);
    mock.expect_at("AT+QICLOSE=0", &["OK"]);

    let b = builder();
    let channel = b.build_with_transport(Box::new(mock));
    let (_, mut modem) = connect(channel, b.pacing()).await.unwrap();
    let reports = cloud::send_message(modem.as_mut(), "KEY1", "hi").await.unwrap();
    assert_eq!(reports.len(), 7);
    // The payload prompt carries no result code.
    assert!(!reports[4].is_ok());
    assert!(reports[6].is_ok());
    assert_eq!(reports[6].command, "AT+QICLOSE=0");
}

#[tokio::test]
async fn huawei_rejects_tcp_receive() {
    let mut mock = MockTransport::new();
    mock.expect_at("ATI", &["Manufacturer: Huawei Technologies Co., Ltd.", "Model: ME909s-120", "OK"]);

    let channel = builder().build_with_transport(Box::new(mock));
    let (_, mut modem) = connect(channel, Pacing::immediate()).await.unwrap();
    assert_eq!(modem.vendor(), Vendor::Huawei);

    let mut rx = cellmodem::TcpReceiver::new(no_delay(), SessionTiming::immediate());
    let err = rx
        .start(modem.as_mut(), cloud::HOLOGRAM_APN, cloud::HOLOGRAM_RECEIVE_PORT, &mut |_| {})
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Unsupported(_)));
}

#[tokio::test]
async fn sms_send_after_identification() {
    let mut mock = MockTransport::new();
    mock.expect_at("ATI", &["Manufacturer: SIMCOM INCORPORATED", "OK"]);
    mock.expect_at("AT+CMGF=1", &["OK"]);
    mock.expect(b"AT+CMGS=\"+15551234567\"\r", b"AT+CMGS=\"+15551234567\"\r\r\n> ");
    mock.expect(b"hello\x1a", b"\r\n+CMGS: 42\r\n\r\nOK\r\n");

    let b = builder();
    let channel = b.build_with_transport(Box::new(mock));
    let (_, mut modem) = connect(channel, b.pacing()).await.unwrap();
    assert_eq!(modem.vendor(), Vendor::Simcom);

    let report = send_sms(modem.channel(), "+15551234567", "hello").await.unwrap();
    assert_eq!(report.reference.as_deref(), Some("42"));
    assert_eq!(report.result, ResultCode::Ok);
}
