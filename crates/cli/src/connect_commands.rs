//! Connection lifecycle commands: connect, disconnect, status, platforms.

use std::time::Duration;

use {
    crier_connections::ConnectionStatus,
    crier_oauth::CallbackListener,
    crier_platforms::{PlatformConstraints, PlatformDescriptor},
};

use crate::app::{App, SUPPORTED_PLATFORMS, descriptor_for};

/// Run the full authorization round-trip for one platform: initiate, open
/// the browser, capture the redirect on the loopback listener, complete.
pub async fn connect(app: &App, platform_id: &str, no_browser: bool) -> anyhow::Result<()> {
    if app.registry.get(platform_id).is_none() && SUPPORTED_PLATFORMS.contains(&platform_id) {
        anyhow::bail!(
            "no credentials configured for {platform_id}; add a [platforms.{platform_id}] section to {}",
            crier_config::find_or_default_config_path().display()
        );
    }

    let ticket = app.manager.initiate(platform_id)?;

    // Bind before the browser opens so the redirect cannot beat the listener.
    let callback = &app.config.callback;
    let listener = CallbackListener::bind(callback.port, callback.path.clone()).await?;

    if no_browser {
        println!("Visit this URL to authorize {platform_id}:\n\n  {}\n", ticket.url);
    } else {
        println!("Opening browser for authorization...");
        if open::that(&ticket.url).is_err() {
            println!("Could not open browser. Please visit:\n{}", ticket.url);
        }
    }

    println!(
        "Waiting for callback on http://{}{} ...",
        listener.addr(),
        callback.path
    );
    let params = listener
        .wait(Duration::from_secs(callback.timeout_secs))
        .await?;

    println!("Exchanging code for tokens...");
    let record = app
        .manager
        .complete(platform_id, &params.code, &params.state)
        .await?;

    match display_user(&record.user_info) {
        Some(user) => println!("Connected to {platform_id} as {user}"),
        None => println!("Connected to {platform_id}"),
    }
    Ok(())
}

pub async fn disconnect(app: &App, platform_id: &str) -> anyhow::Result<()> {
    app.manager.disconnect(platform_id).await?;
    println!("Disconnected {platform_id}");
    Ok(())
}

pub fn status(app: &App, platform_id: Option<&str>, json: bool) -> anyhow::Result<()> {
    let statuses = match platform_id {
        Some(id) => vec![app.manager.status(id)?],
        None => app.manager.statuses(),
    };
    if json {
        println!("{}", serde_json::to_string_pretty(&statuses)?);
        return Ok(());
    }
    if statuses.is_empty() {
        println!(
            "No platforms configured. Add credentials to {} first.",
            crier_config::find_or_default_config_path().display()
        );
        return Ok(());
    }
    for line in statuses.iter().flat_map(status_lines) {
        println!("{line}");
    }
    Ok(())
}

/// List all supported platforms, connected or not, with their constraints.
pub fn platforms(app: &App, json: bool) -> anyhow::Result<()> {
    if json {
        let mut list = Vec::new();
        for id in SUPPORTED_PLATFORMS {
            let Some(descriptor) = descriptor_for(id) else {
                continue;
            };
            let mut value = serde_json::to_value(descriptor)?;
            value["configured"] = app.config.platforms.get(id).is_some().into();
            value["connected"] = app
                .manager
                .status(id)
                .map(|s| s.connected)
                .unwrap_or(false)
                .into();
            list.push(value);
        }
        println!("{}", serde_json::to_string_pretty(&list)?);
        return Ok(());
    }
    for id in SUPPORTED_PLATFORMS {
        let Some(descriptor) = descriptor_for(id) else {
            continue;
        };
        let configured = app.config.platforms.get(id).is_some();
        let connected = app.manager.status(id).map(|s| s.connected).unwrap_or(false);
        for line in platform_lines(descriptor, configured, connected) {
            println!("{line}");
        }
    }
    Ok(())
}

fn status_lines(status: &ConnectionStatus) -> Vec<String> {
    let state = if status.connected {
        match status.expires_at_ms {
            Some(ts) => format!("connected, {}", format_remaining(ts)),
            None => "connected".to_string(),
        }
    } else {
        "not connected".to_string()
    };
    let user = status
        .user_info
        .as_ref()
        .and_then(display_user)
        .map(|u| format!(" as {u}"))
        .unwrap_or_default();

    let mut lines = vec![format!("{:<12} [{state}]{user}", status.platform_id)];
    if let Some(error) = &status.error {
        lines.push(format!("{:<12} last attempt failed: {error}", ""));
    }
    lines
}

fn platform_lines(descriptor: &PlatformDescriptor, configured: bool, connected: bool) -> Vec<String> {
    let state = if connected {
        "connected"
    } else if configured {
        "configured, not connected"
    } else {
        "not configured"
    };
    vec![
        format!(
            "{} {} ({}) [{state}]",
            descriptor.icon, descriptor.display_name, descriptor.id
        ),
        format!("   {}", constraint_summary(&descriptor.constraints)),
    ]
}

fn constraint_summary(limits: &PlatformConstraints) -> String {
    let media = match (limits.supports_images, limits.supports_videos) {
        (true, true) => "images and videos",
        (true, false) => "images only",
        (false, true) => "videos only",
        (false, false) => "text only",
    };
    let mut summary = format!(
        "up to {} chars, {media}, {} hashtags max",
        limits.max_text_length, limits.max_hashtags
    );
    if limits.requires_media {
        summary.push_str(", media required");
    }
    summary
}

fn format_remaining(expires_at_ms: u64) -> String {
    let now = crier_common::now_ms();
    if expires_at_ms <= now {
        return "expired".to_string();
    }
    let remaining = (expires_at_ms - now) / 1_000;
    let hours = remaining / 3600;
    let mins = (remaining % 3600) / 60;
    format!("{hours}h {mins}m remaining")
}

/// Best-effort display name from a captured profile. Twitter and Instagram
/// carry `username`; LinkedIn splits localized first and last names.
fn display_user(user_info: &serde_json::Value) -> Option<String> {
    if let Some(username) = user_info.get("username").and_then(|v| v.as_str()) {
        return Some(format!("@{username}"));
    }
    let first = user_info.get("localizedFirstName").and_then(|v| v.as_str());
    let last = user_info.get("localizedLastName").and_then(|v| v.as_str());
    match (first, last) {
        (Some(first), Some(last)) => Some(format!("{first} {last}")),
        (Some(first), None) => Some(first.to_string()),
        _ => None,
    }
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn username_profiles_display_with_an_at_sign() {
        let user = display_user(&json!({"username": "jack", "name": "Jack"}));
        assert_eq!(user.unwrap(), "@jack");
    }

    #[test]
    fn linkedin_profiles_display_localized_names() {
        let user = display_user(&json!({
            "localizedFirstName": "Ada",
            "localizedLastName": "Lovelace",
        }));
        assert_eq!(user.unwrap(), "Ada Lovelace");
    }

    #[test]
    fn opaque_profiles_have_no_display_name() {
        assert!(display_user(&json!({"id": "123"})).is_none());
    }

    #[test]
    fn status_lines_surface_the_last_failure() {
        let status = ConnectionStatus {
            platform_id: "twitter".into(),
            connected: false,
            expires_at_ms: None,
            user_info: None,
            error: Some("invalid_grant".into()),
        };
        let lines = status_lines(&status);
        assert!(lines[0].contains("[not connected]"));
        assert!(lines[1].contains("invalid_grant"));
    }

    #[test]
    fn connected_status_shows_the_user() {
        let status = ConnectionStatus {
            platform_id: "twitter".into(),
            connected: true,
            expires_at_ms: None,
            user_info: Some(json!({"username": "jack"})),
            error: None,
        };
        let lines = status_lines(&status);
        assert_eq!(lines.len(), 1);
        assert!(lines[0].contains("[connected] as @jack"));
    }

    #[test]
    fn platform_lines_mark_unconfigured_platforms() {
        let descriptor = descriptor_for("instagram").unwrap();
        let lines = platform_lines(descriptor, false, false);
        assert!(lines[0].contains("[not configured]"));
        assert!(lines[1].contains("media required"));
    }

    #[test]
    fn constraint_summary_reads_naturally() {
        let descriptor = descriptor_for("twitter").unwrap();
        let summary = constraint_summary(&descriptor.constraints);
        assert_eq!(summary, "up to 280 chars, images and videos, 10 hashtags max");
    }
}
