use rocket::http::{ContentType, Header, Status};
use rocket::local::asynchronous::Client;
use serde_json::Value;

use demotube::api::AppState;
use demotube::config::AppConfig;
use demotube::database::ops::local::LocalStore;
use demotube::{build_rocket, build_unavailable_rocket};

const BOUNDARY: &str = "demotube-test-boundary";

struct Part<'a> {
    filename: &'a str,
    content_type: &'a str,
    bytes: &'a [u8],
    title: &'a str,
}

fn multipart(parts: &[Part<'_>]) -> Vec<u8> {
    let mut body = Vec::new();
    for part in parts {
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"{}\"\r\nContent-Type: {}\r\n\r\n",
                part.filename, part.content_type
            )
            .as_bytes(),
        );
        body.extend_from_slice(part.bytes);
        body.extend_from_slice(
            format!(
                "\r\n--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"title\"\r\n\r\n{}\r\n",
                part.title
            )
            .as_bytes(),
        );
    }
    body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
    body
}

async fn client_with(config: AppConfig) -> Client {
    let store = LocalStore::open_in_memory().unwrap();
    let state = AppState::start(store).await;
    Client::tracked(build_rocket(state, config)).await.unwrap()
}

async fn client() -> Client {
    client_with(AppConfig::default()).await
}

async fn upload(client: &Client, parts: &[Part<'_>]) -> (Status, Value) {
    let response = client
        .post("/upload")
        .header(Header::new(
            "Content-Type",
            format!("multipart/form-data; boundary={BOUNDARY}"),
        ))
        .body(multipart(parts))
        .dispatch()
        .await;
    let status = response.status();
    (status, response.into_json::<Value>().await.unwrap_or(Value::Null))
}

async fn page(client: &Client, uri: &str) -> String {
    let response = client.get(uri.to_string()).dispatch().await;
    assert_eq!(response.status(), Status::Ok);
    response.into_string().await.unwrap()
}

fn content_urls(html: &str) -> Vec<String> {
    html.match_indices("/content/")
        .map(|(start, _)| {
            let rest = &html[start..];
            let end = rest.find('"').unwrap();
            rest[..end].to_string()
        })
        .collect()
}

fn cat_and_notes() -> Vec<Part<'static>> {
    vec![
        Part {
            filename: "a.mp4",
            content_type: "video/mp4",
            bytes: b"cat frames",
            title: "Cat Jumping",
        },
        Part {
            filename: "notes.txt",
            content_type: "text/plain",
            bytes: b"hello",
            title: "",
        },
    ]
}

#[rocket::async_test]
async fn empty_library_shows_the_empty_state() {
    let client = client().await;
    let html = page(&client, "/").await;
    assert!(html.contains("No videos yet"));
    assert!(!html.contains("class=\"card\""));
    assert!(html.contains("type=\"file\" accept=\"video/*\" multiple"));
}

#[rocket::async_test]
async fn upload_stores_only_video_files() {
    let client = client().await;
    let (status, report) = upload(&client, &cat_and_notes()).await;

    assert_eq!(status, Status::Ok);
    assert_eq!(report["added"].as_array().unwrap().len(), 1);
    assert_eq!(report["dropped"], 1);

    let videos = client
        .get("/api/videos")
        .dispatch()
        .await
        .into_json::<Value>()
        .await
        .unwrap();
    let videos = videos.as_array().unwrap();
    assert_eq!(videos.len(), 1);
    assert_eq!(videos[0]["title"], "Cat Jumping");
    assert_eq!(videos[0]["filename"], "a.mp4");
    assert_eq!(videos[0]["mediaType"], "video/mp4");

    let html = page(&client, "/").await;
    assert!(html.contains("Cat Jumping"));
    assert!(!html.contains("notes.txt"));
}

#[rocket::async_test]
async fn declared_type_decides_regardless_of_extension() {
    let client = client().await;
    let (status, report) = upload(
        &client,
        &[
            Part {
                filename: "notes.mp4",
                content_type: "application/octet-stream",
                bytes: b"not a video",
                title: "",
            },
            Part {
                filename: "clip.txt",
                content_type: "video/webm",
                bytes: b"webm",
                title: "Renamed",
            },
        ],
    )
    .await;

    assert_eq!(status, Status::Ok);
    assert_eq!(report["added"].as_array().unwrap().len(), 1);
    assert_eq!(report["dropped"], 1);

    let videos = client
        .get("/api/videos?filename=notes.mp4")
        .dispatch()
        .await
        .into_json::<Value>()
        .await
        .unwrap();
    assert!(videos.as_array().unwrap().is_empty());
    assert!(!page(&client, "/").await.contains("notes.mp4"));
}

#[rocket::async_test]
async fn range_request_returns_only_the_requested_bytes() {
    let client = client().await;
    upload(
        &client,
        &[Part {
            filename: "count.webm",
            content_type: "video/webm",
            bytes: b"0123456789",
            title: "Count",
        }],
    )
    .await;
    let urls = content_urls(&page(&client, "/").await);

    let response = client
        .get(urls[0].clone())
        .header(Header::new("Range", "bytes=2-5"))
        .dispatch()
        .await;
    assert_eq!(response.status(), Status::PartialContent);
    assert_eq!(response.headers().get_one("Content-Type"), Some("video/webm"));
    assert_eq!(
        response.headers().get_one("Content-Range"),
        Some("bytes 2-5/10")
    );
    assert_eq!(response.into_bytes().await.unwrap(), b"2345");
}

#[rocket::async_test]
async fn blank_title_falls_back_to_the_file_name() {
    let client = client().await;
    upload(
        &client,
        &[Part {
            filename: "clip.webm",
            content_type: "video/webm",
            bytes: b"webm",
            title: "   ",
        }],
    )
    .await;

    let videos = client
        .get("/api/videos?title=clip.webm")
        .dispatch()
        .await
        .into_json::<Value>()
        .await
        .unwrap();
    assert_eq!(videos.as_array().unwrap().len(), 1);
}

#[rocket::async_test]
async fn search_filters_by_title_or_filename() {
    let client = client().await;
    upload(
        &client,
        &[
            Part {
                filename: "a.mp4",
                content_type: "video/mp4",
                bytes: b"a",
                title: "Cat Jumping",
            },
            Part {
                filename: "b.mov",
                content_type: "video/quicktime",
                bytes: b"b",
                title: "Dog Running",
            },
        ],
    )
    .await;

    let html = page(&client, "/?q=CAT").await;
    assert!(html.contains("Cat Jumping"));
    assert!(!html.contains("Dog Running"));

    let html = page(&client, "/?q=mov").await;
    assert!(html.contains("Dog Running"));
    assert!(!html.contains("Cat Jumping"));

    let html = page(&client, "/?q=zebra").await;
    assert!(html.contains("No videos match"));

    let html = page(&client, "/?q=").await;
    assert!(html.contains("Cat Jumping"));
    assert!(html.contains("Dog Running"));
}

#[rocket::async_test]
async fn content_streams_until_the_reference_is_revoked() {
    let client = client().await;
    upload(&client, &cat_and_notes()).await;

    let html = page(&client, "/").await;
    let urls = content_urls(&html);
    assert_eq!(urls.len(), 1);

    let response = client.get(urls[0].clone()).dispatch().await;
    assert_eq!(response.status(), Status::Ok);
    assert_eq!(response.headers().get_one("Content-Type"), Some("video/mp4"));
    assert_eq!(response.into_bytes().await.unwrap(), b"cat frames");

    // Re-rendering the gallery releases the previous preview references.
    page(&client, "/?q=nothing-matches").await;
    let response = client.get(urls[0].clone()).dispatch().await;
    assert_eq!(response.status(), Status::NotFound);
}

#[rocket::async_test]
async fn player_opens_closes_and_deletes() {
    let client = client().await;
    let (_, report) = upload(&client, &cat_and_notes()).await;
    let id = report["added"][0].as_u64().unwrap();

    let response = client.get(format!("/play/{id}")).dispatch().await;
    assert_eq!(response.status(), Status::SeeOther);
    let html = page(&client, "/").await;
    assert!(html.contains("id=\"overlay\""));
    assert!(html.contains("controls autoplay"));

    let response = client.post("/player/close").dispatch().await;
    assert_eq!(response.status(), Status::SeeOther);
    assert!(!page(&client, "/").await.contains("id=\"overlay\""));

    client.get(format!("/play/{id}")).dispatch().await;
    let response = client
        .post("/player/delete")
        .header(ContentType::Form)
        .body("confirmed=true")
        .dispatch()
        .await;
    assert_eq!(response.status(), Status::SeeOther);

    let html = page(&client, "/").await;
    assert!(!html.contains("id=\"overlay\""));
    assert!(html.contains("No videos yet"));
    let response = client.get(format!("/api/videos/{id}")).dispatch().await;
    assert_eq!(response.status(), Status::NotFound);
}

#[rocket::async_test]
async fn playing_an_unknown_id_shows_a_notice() {
    let client = client().await;
    client.get("/play/42").dispatch().await;
    let html = page(&client, "/").await;
    assert!(html.contains("Video not found"));
    assert!(!html.contains("id=\"overlay\""));
    // Shown once.
    assert!(!page(&client, "/").await.contains("Video not found"));
}

#[rocket::async_test]
async fn remove_without_confirmation_keeps_the_record() {
    let client = client().await;
    let (_, report) = upload(&client, &cat_and_notes()).await;
    let id = report["added"][0].as_u64().unwrap();

    client
        .post(format!("/videos/{id}/remove"))
        .header(ContentType::Form)
        .body("")
        .dispatch()
        .await;
    let response = client.get(format!("/api/videos/{id}")).dispatch().await;
    assert_eq!(response.status(), Status::Ok);

    client
        .post(format!("/videos/{id}/remove"))
        .header(ContentType::Form)
        .body("confirmed=true")
        .dispatch()
        .await;
    let response = client.get(format!("/api/videos/{id}")).dispatch().await;
    assert_eq!(response.status(), Status::NotFound);
}

#[rocket::async_test]
async fn read_only_mode_rejects_writes() {
    let client = client_with(AppConfig {
        read_only_mode: true,
        ..AppConfig::default()
    })
    .await;

    let (status, _) = upload(&client, &cat_and_notes()).await;
    assert_eq!(status, Status::Forbidden);

    let response = client
        .post("/videos/1/remove")
        .header(ContentType::Form)
        .body("confirmed=true")
        .dispatch()
        .await;
    assert_eq!(response.status(), Status::Forbidden);

    assert!(page(&client, "/").await.contains("No videos yet"));
}

#[rocket::async_test]
async fn unavailable_storage_serves_a_single_error_page() {
    let client = Client::tracked(build_unavailable_rocket(
        "database is locked".to_string(),
        AppConfig::default(),
    ))
    .await
    .unwrap();

    for uri in ["/", "/play/1", "/api/videos"] {
        let response = client.get(uri).dispatch().await;
        assert_eq!(response.status(), Status::ServiceUnavailable);
        let html = response.into_string().await.unwrap();
        assert!(html.contains("Local storage is unavailable: database is locked"));
    }
}
