use api_types::payment::Payment;
use collect_client::{HtmlPrinter, PrintOutcome, Printer, PrinterTarget};
use engine::{ReceiptOptions, build_receipt};
use tokio::io::AsyncReadExt;

fn receipt() -> engine::Receipt {
    let payment: Payment = serde_json::from_value(serde_json::json!({
        "id": "QJ7K2",
        "name": "Alice Wanjiru",
        "amount": {"cash": 500},
        "statuses": [{"state": "complete"}]
    }))
    .unwrap();
    build_receipt(&payment, &ReceiptOptions::default())
}

fn scratch_dir() -> std::path::PathBuf {
    std::path::PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("../../target/test_receipts")
        .join(uuid::Uuid::new_v4().to_string())
}

#[tokio::test]
async fn tcp_printer_receives_escpos_stream() {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let reader = tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.unwrap();
        let mut bytes = Vec::new();
        socket.read_to_end(&mut bytes).await.unwrap();
        bytes
    });

    let printer = Printer::Thermal(PrinterTarget::Tcp(addr.to_string()));
    let outcome = printer.print(&receipt()).await.unwrap();
    let received = reader.await.unwrap();

    assert_eq!(
        outcome,
        PrintOutcome::Sent {
            target: format!("tcp://{addr}"),
            bytes: received.len(),
        }
    );
    assert!(received.starts_with(&[0x1b, b'@']));
    let text = String::from_utf8_lossy(&received);
    assert!(text.contains("PAYMENT RECEIPT"));
    assert!(text.contains("Name: Alice Wanjiru"));
}

#[tokio::test]
async fn device_target_is_written_like_a_file() {
    let dir = scratch_dir();
    std::fs::create_dir_all(&dir).unwrap();
    let device = dir.join("rfcomm0");
    std::fs::write(&device, b"").unwrap();

    PrinterTarget::Device(device.clone())
        .send(b"\x1b@hello\n")
        .await
        .unwrap();
    assert_eq!(std::fs::read(&device).unwrap(), b"\x1b@hello\n");
}

#[tokio::test]
async fn missing_device_is_a_connect_error() {
    let err = PrinterTarget::Device(scratch_dir().join("absent"))
        .send(b"x")
        .await
        .unwrap_err();
    assert!(err.to_string().contains("not reachable"), "{err}");
}

#[tokio::test]
async fn html_fallback_saves_a_printable_page() {
    let dir = scratch_dir();
    let printer = Printer::Html(HtmlPrinter {
        dir: dir.clone(),
        opener: String::new(),
    });

    let outcome = printer.print(&receipt()).await.unwrap();
    let path = dir.join("receipt-QJ7K2.html");
    assert_eq!(outcome, PrintOutcome::Saved(path.clone()));

    let document = std::fs::read_to_string(path).unwrap();
    assert!(document.contains("window.print()"));
    assert!(document.contains("valid-receipt?id=QJ7K2"));
}
