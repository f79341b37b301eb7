// SPDX-FileCopyrightText: 2026 Lynqar Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Suggested tags from an entry's URL.
//!
//! Pure keyword matching against host labels. No network, no crypto.

use lynqar_core::MAX_TAGS;
use url::Url;

const BANKING: &[&str] = &[
    "bank", "banks", "icici", "hdfc", "sbi", "axis", "pnb", "paytm", "phonepe", "gpay",
    "razorpay", "stripe",
];

const SHOPPING: &[&str] = &[
    "amazon", "flipkart", "myntra", "ajio", "nykaa", "bigbasket", "swiggy", "zomato", "blinkit",
    "aliexpress", "ebay",
];

const SOCIAL: &[&str] = &[
    "facebook", "instagram", "twitter", "linkedin", "tiktok", "snapchat", "whatsapp", "telegram",
    "discord", "slack",
];

const ENTERTAINMENT: &[&str] = &[
    "netflix", "prime", "hotstar", "disney", "youtube", "vimeo", "spotify", "soundcloud", "gaana",
];

const WORK: &[&str] = &[
    "gmail", "outlook", "office365", "zoom", "teams", "slack", "gitlab", "github", "bitbucket",
];

const DEVELOPER: &[&str] = &[
    "github", "gitlab", "bitbucket", "stackoverflow", "docker", "npm", "yarn", "vercel", "figma",
    "code",
];

/// Categories in output order.
const CATEGORIES: &[(&str, &[&str])] = &[
    ("Banking", BANKING),
    ("Shopping", SHOPPING),
    ("Social", SOCIAL),
    ("Entertainment", ENTERTAINMENT),
    ("Work", WORK),
    ("Developer", DEVELOPER),
];

/// Suggest up to three category tags for `url`.
///
/// Text without a `scheme://` prefix is treated as `https://<text>`.
/// Unparseable input and URLs without a host yield no tags.
pub fn classify(url: &str) -> Vec<String> {
    let Some(host) = host_of(url) else {
        return Vec::new();
    };
    let labels: Vec<&str> = host.split('.').filter(|l| !l.is_empty()).collect();

    CATEGORIES
        .iter()
        .filter(|(_, keywords)| {
            keywords
                .iter()
                .any(|kw| labels.iter().any(|label| label.contains(kw)))
        })
        .map(|(name, _)| (*name).to_string())
        .take(MAX_TAGS)
        .collect()
}

fn host_of(text: &str) -> Option<String> {
    let text = text.trim();
    if text.is_empty() {
        return None;
    }
    let parsed = if text.contains("://") {
        Url::parse(text)
    } else {
        Url::parse(&format!("https://{text}"))
    }
    .ok()?;
    parsed.host_str().map(str::to_lowercase)
}
