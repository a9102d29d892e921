use chrono::{DateTime, Utc};
use serde::Deserialize;

use crate::clip::Clip;

#[derive(Debug, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    #[serde(default)]
    pub expires_in: Option<u64>,
}

/// Envelope used by every Helix listing endpoint.
#[derive(Debug, Deserialize)]
pub struct HelixResponse<T> {
    pub data: Vec<T>,
    // pagination is ignored, only the first page is read
}

#[derive(Debug, Deserialize)]
pub struct HelixUser {
    pub id: String,
    pub login: String,
    pub display_name: String,
}

#[derive(Debug, Deserialize)]
pub struct HelixClip {
    pub id: String,
    pub url: String,
    pub creator_name: String,
    pub title: String,
    pub view_count: u64,
    pub created_at: DateTime<Utc>,
    pub thumbnail_url: String,
}

impl HelixClip {
    pub fn into_clip(self, broadcaster_display_name: &str) -> Clip {
        Clip {
            id: self.id,
            title: self.title,
            url: self.url,
            creator_name: self.creator_name,
            view_count: self.view_count,
            thumbnail_url: self.thumbnail_url,
            created_at: self.created_at,
            broadcaster_display_name: broadcaster_display_name.to_owned(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_clips_page() {
        let body = r#"{
            "data": [{
                "id": "AwkwardHelplessSalamanderSwiftRage",
                "url": "https://clips.twitch.tv/AwkwardHelplessSalamanderSwiftRage",
                "broadcaster_id": "67955580",
                "broadcaster_name": "ChewieMelodies",
                "creator_id": "53834192",
                "creator_name": "BlackNova03",
                "video_id": "205586603",
                "game_id": "488191",
                "language": "en",
                "title": "babymetal",
                "view_count": 10,
                "created_at": "2017-11-30T22:34:18Z",
                "thumbnail_url": "https://clips-media-assets.twitch.tv/157589949-preview.jpg",
                "duration": 60,
                "vod_offset": 480,
                "is_featured": false
            }],
            "pagination": { "cursor": "eyJiIjpudWxsLCJhIjoiIn0" }
        }"#;

        let page: HelixResponse<HelixClip> = serde_json::from_str(body).unwrap();
        assert_eq!(page.data.len(), 1);

        let clip = page.data.into_iter().next().unwrap().into_clip("ChewieMelodies");
        assert_eq!(clip.id, "AwkwardHelplessSalamanderSwiftRage");
        assert_eq!(clip.creator_name, "BlackNova03");
        assert_eq!(clip.view_count, 10);
        assert_eq!(clip.broadcaster_display_name, "ChewieMelodies");
        assert_eq!(clip.created_at.to_rfc3339(), "2017-11-30T22:34:18+00:00");
    }

    #[test]
    fn test_parse_empty_users() {
        let page: HelixResponse<HelixUser> = serde_json::from_str(r#"{"data": []}"#).unwrap();
        assert!(page.data.is_empty());
    }
}
