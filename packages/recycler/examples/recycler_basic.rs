//! Demonstrates registering a kind and recycling its objects through the registry.
//!
//! The registry's `trace` events are printed to stdout, showing when objects are reused.

use recycler::Registry;
use tracing::Level;

/// A parsed request whose buffers are worth keeping between uses.
#[derive(Debug, Default)]
struct Request {
    path: String,
    headers: Vec<(String, String)>,
}

fn main() {
    tracing_subscriber::fmt().with_max_level(Level::TRACE).init();

    let registry = Registry::new();

    let registered = registry.register(
        2,
        Request::default,
        |request: &mut Request, path: &'static str| request.path.push_str(path),
        |request: &mut Request| {
            request.path.clear();
            request.headers.clear();
        },
    );
    assert!(registered);

    let requests = registry
        .recycler::<Request, &'static str>()
        .expect("kind was registered above");

    let mut request = requests.acquire("/index.html");
    request
        .headers
        .push(("authorization".to_string(), "Bearer hunter2".to_string()));
    println!("Handling {request:?}");
    requests.release(request);

    println!("Idle requests after release: {}", requests.idle_len());

    {
        let request = requests.acquire_recycled("/about.html");
        println!("Handling {:?}", *request);
        assert!(request.headers.is_empty());
    }

    println!("Idle requests after scoped use: {}", requests.idle_len());
}
