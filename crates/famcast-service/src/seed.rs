//! Development seed file for the in-process collaborators.
//!
//! A seed file gives a freshly started server usable devices and videos
//! without any registration round trips, e.g.:
//!
//! ```toml
//! [[devices]]
//! name = "Dana"
//! role = "parent"
//! token = "parent-token"
//!
//! [[devices]]
//! name = "Tablet"
//! role = "child"
//! token = "child-token"
//! parent = "Dana"
//!
//! [[videos]]
//! id = "v1"
//! owner = "Dana"
//! title = "Morning Cartoons"
//! url = "https://videos.example/v1.mp4"
//! duration = 620.0
//! ```

use std::collections::HashMap;

use serde::Deserialize;

use famcast_core::error::AppError;
use famcast_core::result::AppResult;
use famcast_core::types::id::VideoId;
use famcast_core::types::role::DeviceRole;
use famcast_core::types::video::VideoDescriptor;

use crate::catalog::library::VideoLibrary;
use crate::identity::registry::DeviceRegistry;

/// One seeded device.
#[derive(Debug, Clone, Deserialize)]
pub struct SeedDevice {
    /// Display name, also the reference key for `parent` and `owner`.
    pub name: String,
    /// Device role.
    pub role: DeviceRole,
    /// Bearer token the device authenticates with.
    pub token: String,
    /// For children: name of the parent to pre-pair with.
    #[serde(default)]
    pub parent: Option<String>,
}

/// One seeded video.
#[derive(Debug, Clone, Deserialize)]
pub struct SeedVideo {
    /// Catalog id.
    pub id: String,
    /// Name of the owning parent device.
    pub owner: String,
    /// Display title.
    pub title: String,
    /// Playable URL.
    pub url: String,
    /// Duration in seconds.
    pub duration: f64,
}

/// Parsed seed file contents.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SeedData {
    /// Devices to register.
    #[serde(default)]
    pub devices: Vec<SeedDevice>,
    /// Videos to add, in playlist order per owner.
    #[serde(default)]
    pub videos: Vec<SeedVideo>,
}

impl SeedData {
    /// Load a seed file.
    pub fn load(path: &str) -> AppResult<Self> {
        let source = config::Config::builder()
            .add_source(config::File::with_name(path))
            .build()?;
        Ok(source.try_deserialize()?)
    }

    /// Apply the seed to the registry and library.
    pub fn apply(&self, registry: &DeviceRegistry, library: &VideoLibrary) -> AppResult<()> {
        let mut by_name = HashMap::new();

        for device in &self.devices {
            let user_id = match device.role {
                DeviceRole::Parent => registry.register_parent(&device.name, &device.token),
                DeviceRole::Child => registry.register_child(&device.name, &device.token),
            };
            by_name.insert(device.name.clone(), user_id);
        }

        for device in &self.devices {
            if let Some(parent_name) = &device.parent {
                let parent_id = *by_name.get(parent_name).ok_or_else(|| {
                    AppError::configuration(format!("Seed references unknown parent '{parent_name}'"))
                })?;
                let child_id = by_name[&device.name];
                registry.link(parent_id, child_id)?;
            }
        }

        for video in &self.videos {
            let owner = *by_name.get(&video.owner).ok_or_else(|| {
                AppError::configuration(format!("Seed references unknown owner '{}'", video.owner))
            })?;
            library.add_video(
                owner,
                VideoId::new(video.id.clone()),
                VideoDescriptor {
                    title: video.title.clone(),
                    playable_url: video.url.clone(),
                    duration_seconds: video.duration,
                },
            );
        }

        tracing::info!(
            devices = self.devices.len(),
            videos = self.videos.len(),
            "Seed applied"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_apply_registers_pairs_and_playlists() {
        let seed = SeedData {
            devices: vec![
                SeedDevice {
                    name: "Dana".to_string(),
                    role: DeviceRole::Parent,
                    token: "tok-p".to_string(),
                    parent: None,
                },
                SeedDevice {
                    name: "Tablet".to_string(),
                    role: DeviceRole::Child,
                    token: "tok-c".to_string(),
                    parent: Some("Dana".to_string()),
                },
            ],
            videos: vec![SeedVideo {
                id: "v1".to_string(),
                owner: "Dana".to_string(),
                title: "Morning Cartoons".to_string(),
                url: "https://videos.example/v1.mp4".to_string(),
                duration: 620.0,
            }],
        };

        let registry = DeviceRegistry::new();
        let library = VideoLibrary::new();
        seed.apply(&registry, &library).unwrap();

        assert_eq!(registry.device_count(), 2);
        assert_eq!(library.video_count(), 1);

        use famcast_core::traits::identity::IdentityResolver;
        let parent = registry.resolve("tok-p").await.unwrap();
        let child = registry.resolve("tok-c").await.unwrap();
        assert_eq!(parent.partner_id, Some(child.user_id));
        assert_eq!(child.partner_id, Some(parent.user_id));
    }

    #[test]
    fn test_unknown_owner_is_a_configuration_error() {
        let seed = SeedData {
            devices: Vec::new(),
            videos: vec![SeedVideo {
                id: "v1".to_string(),
                owner: "Nobody".to_string(),
                title: "t".to_string(),
                url: "u".to_string(),
                duration: 1.0,
            }],
        };

        let registry = DeviceRegistry::new();
        let library = VideoLibrary::new();
        assert!(seed.apply(&registry, &library).is_err());
    }
}
