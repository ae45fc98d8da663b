use bytes::Bytes;
use http::{Method, Request, StatusCode};
use parapet_recover::write::JsonWriter;
use parapet_recover::{Recovery, must_status};
use parapet_tools::body::Raw;
use parapet_tools::{
    Builder, BufferedResponse, Handler, RequestBuilder, RequestReader, ResponseWriter, handler_fn,
};
use tracing::{Level, info};
use tracing_subscriber::FmtSubscriber;

/// Greets whoever is named in the request body.
///
/// Every failure escalates through the panic boundary: a non-UTF-8 body
/// becomes a 400, the "nobody" easter egg panics outright, and the
/// recovery middleware turns both into JSON error responses.
async fn greet(req: Request<Bytes>, w: &mut dyn ResponseWriter) {
    let reader = RequestReader::new(&req);
    let name = must_status(reader.text(), StatusCode::BAD_REQUEST).to_owned();

    assert!(name != "nobody", "nobody to greet");

    Builder::new().raw_body(format!("hello, {name}\r\n")).must_write(w);
}

async fn drive(app: &impl Handler, req: Request<Bytes>) {
    let mut sink = BufferedResponse::new();
    app.handle(req, &mut sink).await;

    let response = sink.into_response();
    info!(status = %response.status(), body = %String::from_utf8_lossy(response.body()), "response");
}

#[tokio::main]
async fn main() {
    let subscriber = FmtSubscriber::builder().with_max_level(Level::INFO).finish();
    tracing::subscriber::set_global_default(subscriber).expect("setting default subscriber failed");

    let app = Recovery::new(handler_fn(greet), JsonWriter::new());

    // 200 hello, world
    let ok = RequestBuilder::new(Method::POST, "http://localhost/greet")
        .body(Raw::from("world"))
        .build()
        .expect("request should build");
    drive(&app, ok).await;

    // 400 {"message":"body is not utf8","code":400}
    let garbled = RequestBuilder::new(Method::POST, "http://localhost/greet")
        .body(Raw::new(vec![0xff, 0xfe]))
        .build()
        .expect("request should build");
    drive(&app, garbled).await;

    // 500 {"message":"Panic: nobody to greet","code":500}
    let nobody = RequestBuilder::new(Method::POST, "http://localhost/greet")
        .body(Raw::from("nobody"))
        .build()
        .expect("request should build");
    drive(&app, nobody).await;
}
