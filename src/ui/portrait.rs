use std::sync::Arc;

use anyhow::Context;
use eframe::egui;

use crate::model::level::MonsterImage;

/// Decodes a generated monster portrait into something egui can upload.
pub fn decode_portrait(image: &MonsterImage) -> anyhow::Result<egui::ColorImage> {
    let decoded = image::load_from_memory(&image.bytes)
        .with_context(|| format!("decoding {} portrait", image.mime_type))?
        .to_rgba8();
    let size = [decoded.width() as usize, decoded.height() as usize];
    Ok(egui::ColorImage::from_rgba_unmultiplied(size, decoded.as_raw()))
}

/// Uploads each portrait once and keeps the texture while the level lasts.
#[derive(Default)]
pub struct PortraitCache {
    source: Option<Arc<MonsterImage>>,
    texture: Option<egui::TextureHandle>,
}

impl PortraitCache {
    pub fn texture(
        &mut self,
        ctx: &egui::Context,
        image: Option<&Arc<MonsterImage>>,
    ) -> Option<&egui::TextureHandle> {
        let Some(image) = image else {
            self.source = None;
            self.texture = None;
            return None;
        };

        let unchanged = self
            .source
            .as_ref()
            .is_some_and(|cached| Arc::ptr_eq(cached, image));
        if !unchanged {
            self.source = Some(Arc::clone(image));
            self.texture = match decode_portrait(image) {
                Ok(pixels) => {
                    Some(ctx.load_texture("monster-portrait", pixels, egui::TextureOptions::LINEAR))
                }
                Err(err) => {
                    tracing::warn!("showing placeholder instead of portrait: {err:#}");
                    None
                }
            };
        }

        self.texture.as_ref()
    }
}
