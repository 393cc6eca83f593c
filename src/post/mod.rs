//! Fetching and modeling social posts.
//!
//! Posts are resolved through an FxTwitter-compatible JSON API, which serves
//! twitter.com and x.com status links without authentication.

use crate::error::{Result, SvarError};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;
use tracing::{debug, info, warn};

static STATUS_PATH_RE: OnceLock<Regex> = OnceLock::new();

fn status_path_re() -> &'static Regex {
    STATUS_PATH_RE
        .get_or_init(|| Regex::new(r"^/(\w+)/status/(\d+)").expect("static status path pattern"))
}

const POST_HOSTS: &[&str] = &[
    "twitter.com",
    "www.twitter.com",
    "mobile.twitter.com",
    "x.com",
    "www.x.com",
];

/// Author and status id extracted from a post URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostRef {
    pub author: String,
    pub id: String,
}

/// Parse a twitter.com or x.com status URL into author and id.
pub fn parse_post_url(url: &str) -> Result<PostRef> {
    let invalid = || {
        warn!("Not a recognizable post URL: {}", url);
        SvarError::InvalidInput(format!(
            "Not a twitter.com or x.com status URL: {}",
            url
        ))
    };

    let parsed = url::Url::parse(url).map_err(|_| invalid())?;
    if !POST_HOSTS.contains(&parsed.host_str().unwrap_or_default()) {
        return Err(invalid());
    }

    match status_path_re().captures(parsed.path()) {
        Some(caps) => {
            let author = caps[1].to_string();
            let id = caps[2].to_string();
            debug!("Extracted author: {}, post id: {}", author, id);
            Ok(PostRef { author, id })
        }
        None => Err(invalid()),
    }
}

/// Envelope returned by the post API.
#[derive(Debug, Clone, Deserialize)]
struct ApiResponse {
    #[serde(default)]
    code: u32,
    #[serde(default)]
    message: String,
    tweet: Option<Post>,
}

/// A fetched social post.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Post {
    pub text: String,
    pub author: Author,
    #[serde(default)]
    pub media: Option<MediaCollection>,
    #[serde(default)]
    pub quote: Option<Box<Post>>,
}

/// Post author metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Author {
    pub name: String,
    pub screen_name: String,
    #[serde(default)]
    pub avatar_url: Option<String>,
    #[serde(default)]
    pub banner_url: Option<String>,
}

/// Media attached to a post.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MediaCollection {
    #[serde(default)]
    pub all: Vec<MediaItem>,
}

/// One attached media item.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MediaItem {
    #[serde(rename = "type")]
    pub kind: MediaKind,
    pub url: String,
}

/// Kind of attached media.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    Photo,
    Video,
    Gif,
}

impl Post {
    /// Media items attached to this post, empty if none.
    pub fn media_items(&self) -> &[MediaItem] {
        self.media.as_ref().map(|m| m.all.as_slice()).unwrap_or(&[])
    }

    /// Render the post as the markdown context block fed to analysis.
    pub fn context_markdown(&self, media_descriptions: &[String]) -> String {
        let mut context = format!(
            "## Post Text\n\n{}\n\n## Post Author\n\n{} (@{})\n",
            self.text, self.author.name, self.author.screen_name
        );

        if !media_descriptions.is_empty() {
            context.push_str("\n## Post Media Descriptions\n\n");
            for desc in media_descriptions {
                context.push_str(&format!("- {}\n", desc));
            }
        }

        if let Some(quote) = &self.quote {
            context.push_str(&format!(
                "\n## Quoted Post\n\n### Quote Text\n\n{}\n\n### Quote Author\n\n{} (@{})\n",
                quote.text, quote.author.name, quote.author.screen_name
            ));
        }

        context
    }
}

/// Client for the post API.
pub struct PostFetcher {
    client: reqwest::Client,
    api_base: String,
}

impl PostFetcher {
    /// Create a fetcher against the given API base URL.
    pub fn new(api_base: &str) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_base: api_base.trim_end_matches('/').to_string(),
        }
    }

    /// Fetch the post behind a twitter.com / x.com status URL.
    pub async fn fetch(&self, url: &str) -> Result<Post> {
        let post_ref = parse_post_url(url)?;
        info!("Fetching post {} by @{}", post_ref.id, post_ref.author);

        let api_url = format!("{}/status/{}", self.api_base, post_ref.id);
        debug!("Requesting: {}", api_url);

        let response = self.client.get(&api_url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(SvarError::Post(format!(
                "Post API returned status {} for {}",
                status, api_url
            )));
        }

        let envelope: ApiResponse = response.json().await?;
        envelope.tweet.ok_or_else(|| {
            SvarError::Post(format!(
                "Post API response without post data (code {}: {})",
                envelope.code, envelope.message
            ))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_twitter_and_x_urls() {
        let a = parse_post_url("https://twitter.com/rustlang/status/1234567890").unwrap();
        assert_eq!(a.author, "rustlang");
        assert_eq!(a.id, "1234567890");

        let b = parse_post_url("https://x.com/GroqInc/status/1851251889309986932").unwrap();
        assert_eq!(b.author, "GroqInc");
        assert_eq!(b.id, "1851251889309986932");
    }

    #[test]
    fn test_parse_rejects_other_urls() {
        assert!(parse_post_url("https://example.com/foo").is_err());
        assert!(parse_post_url("https://x.com/rustlang").is_err());
        assert!(parse_post_url("not a url").is_err());
        // Host must actually be a post host, not merely contain one
        assert!(parse_post_url("https://evil.example/x.com/a/status/1").is_err());
    }

    #[test]
    fn test_deserialize_api_response() {
        let json = r#"{
            "code": 200,
            "message": "OK",
            "tweet": {
                "text": "Announcing Rust 1.80",
                "author": {
                    "name": "Rust Language",
                    "screen_name": "rustlang",
                    "avatar_url": "https://example.com/avatar.jpg"
                },
                "media": {
                    "all": [
                        {"type": "photo", "url": "https://example.com/pic.jpg"},
                        {"type": "video", "url": "https://example.com/clip.mp4"}
                    ]
                }
            }
        }"#;

        let envelope: ApiResponse = serde_json::from_str(json).unwrap();
        let post = envelope.tweet.unwrap();
        assert_eq!(post.text, "Announcing Rust 1.80");
        assert_eq!(post.author.screen_name, "rustlang");
        assert_eq!(post.media_items().len(), 2);
        assert_eq!(post.media_items()[0].kind, MediaKind::Photo);
        assert_eq!(post.media_items()[1].kind, MediaKind::Video);
    }

    #[test]
    fn test_context_markdown_includes_media_and_quote() {
        let post = Post {
            text: "main post".to_string(),
            author: Author {
                name: "Alice".to_string(),
                screen_name: "alice".to_string(),
                avatar_url: None,
                banner_url: None,
            },
            media: None,
            quote: Some(Box::new(Post {
                text: "quoted".to_string(),
                author: Author {
                    name: "Bob".to_string(),
                    screen_name: "bob".to_string(),
                    avatar_url: None,
                    banner_url: None,
                },
                media: None,
                quote: None,
            })),
        };

        let context = post.context_markdown(&["a photo of a crab".to_string()]);
        assert!(context.contains("## Post Text"));
        assert!(context.contains("main post"));
        assert!(context.contains("Alice (@alice)"));
        assert!(context.contains("- a photo of a crab"));
        assert!(context.contains("## Quoted Post"));
        assert!(context.contains("quoted"));
    }

    #[test]
    fn test_context_markdown_without_media_or_quote() {
        let post = Post {
            text: "plain".to_string(),
            author: Author {
                name: "Alice".to_string(),
                screen_name: "alice".to_string(),
                avatar_url: None,
                banner_url: None,
            },
            media: None,
            quote: None,
        };

        let context = post.context_markdown(&[]);
        assert!(!context.contains("Media Descriptions"));
        assert!(!context.contains("Quoted Post"));
    }
}
