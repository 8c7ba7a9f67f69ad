//! Import and ticket lifecycles against the live mock server.
//!
//! # Design
//! Starts the mock server on a random port with a page size of two, then
//! exercises every endpoint operation over real HTTP through the default
//! `UreqTransport`.

use std::net::SocketAddr;

use clubcollect_core::{ApiError, ClientConfig, ClubCollectClient, ErrorCause};

const COMPANY: &str = "company-1";

fn start_server() -> SocketAddr {
    let std_listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = std_listener.local_addr().unwrap();
    std_listener.set_nonblocking(true).unwrap();

    std::thread::spawn(move || {
        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap();
        rt.block_on(async {
            let listener = tokio::net::TcpListener::from_std(std_listener).unwrap();
            mock_server::serve(listener, mock_server::app_with(mock_server::API_KEY, 2)).await
        })
        .unwrap();
    });

    addr
}

fn client(addr: SocketAddr, api_key: &str) -> ClubCollectClient {
    let config = ClientConfig::new(api_key, COMPANY).base_url(format!("http://{addr}"));
    ClubCollectClient::new(config).unwrap()
}

fn titles(imports: &[clubcollect_core::Import<'_>]) -> Vec<String> {
    imports
        .iter()
        .map(|import| import.title().unwrap_or_default().to_string())
        .collect()
}

#[test]
fn import_lifecycle() {
    let addr = start_server();
    let client = client(addr, mock_server::API_KEY);
    let imports = client.imports();

    // Step 1: nothing yet; an empty list needs no page requests.
    assert_eq!(imports.fetch_page_info().unwrap().total_pages, 0);
    assert!(imports.fetch_all(None, None).unwrap().is_empty());

    // Step 2: create three imports.
    let first = imports.create(Some("January"), Some(10)).unwrap();
    assert_eq!(first.company_id(), COMPANY);
    assert_eq!(first.expected_invoices_count(), Some(10));
    assert!(!first.transmitted());
    imports.create(Some("February"), None).unwrap();
    imports.create(Some("March"), None).unwrap();

    // Step 3: pagination over two pages.
    assert_eq!(imports.fetch_page_info().unwrap().total_pages, 2);
    assert_eq!(
        titles(&imports.fetch_all(None, None).unwrap()),
        ["January", "February", "March"]
    );
    assert_eq!(titles(&imports.fetch_all(Some(2), None).unwrap()), ["March"]);
    assert_eq!(
        titles(&imports.fetch_all(Some(1), Some(1)).unwrap()),
        ["January", "February"]
    );

    // Step 4: invalid range is rejected locally.
    let err = imports.fetch_all(Some(3), Some(1)).unwrap_err();
    assert!(matches!(err.causes(), [ErrorCause::Range { from: 3, to: Some(1) }]));

    // Step 5: fetch, update and transmit through the resource.
    let fetched = imports.fetch(first.import_id()).unwrap();
    assert_eq!(fetched.title(), Some("January"));
    assert_eq!(fetched.created_at(), first.created_at());

    let updated = fetched.update(Some(12)).unwrap();
    assert_eq!(updated.expected_invoices_count(), Some(12));

    let transmitted = updated.transmit().unwrap();
    assert!(transmitted.transmitted());
    assert!(transmitted.refresh().unwrap().transmitted());

    let err = transmitted.transmit().unwrap_err();
    assert_eq!(err.status(), Some(422));

    // Step 6: delete, then the import is gone.
    let id = transmitted.import_id().to_string();
    transmitted.delete().unwrap();
    let err: ApiError = imports.fetch(&id).unwrap_err();
    assert!(err.is_not_found());
    assert!(imports.delete(&id).unwrap_err().is_not_found());
    assert_eq!(imports.fetch_all(None, None).unwrap().len(), 2);
}

#[test]
fn ticket_lifecycle() {
    let addr = start_server();
    let client = client(addr, mock_server::API_KEY);
    let tickets = client.tickets();

    let opened = tickets.create("inv-1", "Can I pay in two terms?").unwrap();
    assert_eq!(opened.invoice_id(), Some("inv-1"));
    assert_eq!(opened.message(), "Can I pay in two terms?");

    opened.reply("Second question").unwrap();
    tickets.create("inv-1", "Third").unwrap();
    tickets.create("inv-2", "Other invoice").unwrap();

    assert_eq!(tickets.fetch_page_info("inv-1").unwrap().total_pages, 2);
    let all = tickets.fetch_all("inv-1", None, None).unwrap();
    let messages: Vec<&str> = all.iter().map(|ticket| ticket.message()).collect();
    assert_eq!(messages, ["Can I pay in two terms?", "Second question", "Third"]);
    assert!(all.iter().all(|ticket| ticket.invoice_id() == Some("inv-1")));
}

#[test]
fn wrong_api_key_is_rejected() {
    let addr = start_server();
    let client = client(addr, "not-the-key");

    let err = client.imports().fetch_page_info().unwrap_err();
    assert_eq!(err.status(), Some(401));
    assert!(matches!(
        err.causes(),
        [ErrorCause::HttpStatus { body, .. }] if body.contains("invalid api_key")
    ));
}

#[test]
fn unreachable_server_is_a_transport_error() {
    let addr = {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap()
    };
    let client = client(addr, mock_server::API_KEY);

    let err = client.imports().fetch("imp-1").unwrap_err();
    assert!(matches!(err.causes(), [ErrorCause::Transport(_)]));
}
