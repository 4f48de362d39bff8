use super::Provider;

/// `(name, endpoint, schemes)` of the providers that are known without any configuration.
const BUILTIN_PROVIDERS: &[(&str, &str, &[&str])] = &[
    (
        "YouTube",
        "https://www.youtube.com/oembed",
        &[
            "https://*.youtube.com/watch*",
            "https://*.youtube.com/v/*",
            "https://*.youtube.com/shorts/*",
            "https://*.youtube.com/playlist?list=*",
            "https://youtube.com/watch*",
            "https://youtube.com/shorts/*",
            "https://youtu.be/*",
        ],
    ),
    (
        "Vimeo",
        "https://vimeo.com/api/oembed.{format}",
        &[
            "https://vimeo.com/*",
            "https://vimeo.com/album/*/video/*",
            "https://vimeo.com/channels/*/*",
            "https://vimeo.com/groups/*/videos/*",
            "https://player.vimeo.com/video/*",
        ],
    ),
    (
        "Instagram",
        "https://graph.facebook.com/v16.0/instagram_oembed",
        &[
            "https://instagram.com/*/p/*",
            "https://www.instagram.com/*/p/*",
            "https://instagram.com/p/*",
            "https://www.instagram.com/p/*",
            "https://instagram.com/reel/*",
            "https://www.instagram.com/reel/*",
            "https://instagram.com/tv/*",
            "https://www.instagram.com/tv/*",
        ],
    ),
    (
        "Facebook",
        "https://graph.facebook.com/v16.0/oembed_post",
        &[
            "https://www.facebook.com/*/posts/*",
            "https://www.facebook.com/*/activity/*",
            "https://www.facebook.com/photo.php?fbid=*",
            "https://www.facebook.com/photos/*",
            "https://www.facebook.com/permalink.php?story_fbid=*",
            "https://www.facebook.com/*/videos/*",
            "https://www.facebook.com/video.php?v=*",
        ],
    ),
    (
        "TikTok",
        "https://www.tiktok.com/oembed",
        &["https://www.tiktok.com/*/video/*", "https://www.tiktok.com/*"],
    ),
    (
        "Twitter",
        "https://publish.twitter.com/oembed",
        &[
            "https://twitter.com/*/status/*",
            "https://*.twitter.com/*/status/*",
            "https://x.com/*/status/*",
        ],
    ),
    (
        "Spotify",
        "https://open.spotify.com/oembed",
        &["https://open.spotify.com/*", "spotify:*"],
    ),
    (
        "SoundCloud",
        "https://soundcloud.com/oembed",
        &["https://soundcloud.com/*", "https://on.soundcloud.com/*"],
    ),
    (
        "Flickr",
        "https://www.flickr.com/services/oembed/",
        &[
            "https://*.flickr.com/photos/*",
            "https://flic.kr/p/*",
            "https://*.*.flickr.com/*",
        ],
    ),
    (
        "Dailymotion",
        "https://www.dailymotion.com/services/oembed",
        &["https://www.dailymotion.com/video/*", "https://dai.ly/*"],
    ),
    (
        "Reddit",
        "https://www.reddit.com/oembed",
        &[
            "https://reddit.com/r/*/comments/*/*",
            "https://www.reddit.com/r/*/comments/*/*",
        ],
    ),
];

pub(super) fn providers() -> Vec<Provider> {
    BUILTIN_PROVIDERS
        .iter()
        .filter_map(|&(name, endpoint, schemes)| {
            match Provider::new(name, endpoint, schemes) {
                Ok(provider) => Some(provider),
                Err(error) => {
                    tracing::error!(
                        provider = name,
                        error = &error as &dyn std::error::Error,
                        "Invalid built-in provider"
                    );
                    None
                }
            }
        })
        .collect()
}
