//! Per-frame recognition: locate, rectify, deglare, match, annotate.

use crate::catalog::{CardCatalog, CardInfo};
use crate::glare::{remove_glare, GlareParams};
use crate::io::InfoPanel;
use crate::session::DisplayState;
use crate::ScanError;
use cardscan_core::{quad_bounds, rectify, ColorImageView, Quad};
use cardscan_fingerprint::{FingerprintDatabase, Matcher};
use cardscan_locate::{locate_candidates, LocateParams};
use image::{Rgb, RgbImage};
use imageproc::drawing::draw_hollow_rect_mut;
use imageproc::rect::Rect;
use serde::{Deserialize, Serialize};

#[cfg(feature = "tracing")]
use tracing::instrument;

/// Outline color for located cards.
pub const OUTLINE_COLOR: Rgb<u8> = Rgb([255, 255, 0]);

/// Settings for [`CardPipeline`].
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineParams {
    pub locate: LocateParams,
    pub glare: GlareParams,
    /// Reject nearest neighbors farther than this. `None` accepts all.
    pub max_distance: Option<u32>,
}

/// One card found in a frame.
#[derive(Clone, Debug, PartialEq)]
pub struct Detection {
    pub quad: Quad,
    /// `None` when the nearest reference failed the distance gate.
    pub identifier: Option<String>,
    pub distance: u32,
    pub metadata: Option<CardInfo>,
    /// Whether this detection refreshed the info panel.
    pub shown: bool,
}

/// Card recognizer over a fixed reference database.
pub struct CardPipeline<'a> {
    params: PipelineParams,
    matcher: Matcher<'a>,
    catalog: &'a dyn CardCatalog,
}

impl<'a> CardPipeline<'a> {
    /// Fails with [`ScanError::EmptyDatabase`] when there is nothing to
    /// match against.
    pub fn new(
        db: &'a FingerprintDatabase,
        catalog: &'a dyn CardCatalog,
        params: PipelineParams,
    ) -> Result<Self, ScanError> {
        if db.is_empty() {
            return Err(ScanError::EmptyDatabase);
        }
        let matcher = Matcher::new(db, params.max_distance);
        Ok(Self {
            params,
            matcher,
            catalog,
        })
    }

    pub fn params(&self) -> &PipelineParams {
        &self.params
    }

    pub fn database(&self) -> &'a FingerprintDatabase {
        self.matcher.database()
    }

    /// Recognize every card in `frame` and outline it in place.
    ///
    /// All candidates are matched against the unmodified frame before any
    /// outline is drawn. The info panel is called for each accepted
    /// identifier that differs from the one `state` last showed.
    #[cfg_attr(
        feature = "tracing",
        instrument(level = "debug", skip_all, fields(width = frame.width(), height = frame.height()))
    )]
    pub fn process_frame(
        &self,
        frame: &mut RgbImage,
        state: &mut DisplayState,
        panel: &mut dyn InfoPanel,
    ) -> Vec<Detection> {
        let detections = self.identify(frame, state, panel);
        for detection in &detections {
            draw_outline(frame, &detection.quad);
        }
        detections
    }

    /// Recognize every card in `frame` without annotating it.
    pub fn identify(
        &self,
        frame: &RgbImage,
        state: &mut DisplayState,
        panel: &mut dyn InfoPanel,
    ) -> Vec<Detection> {
        let quads = locate_candidates(frame, &self.params.locate);
        let mut detections = Vec::with_capacity(quads.len());

        for quad in quads {
            let Some(card) = self.card_image(frame, &quad) else {
                log::debug!("skipping degenerate candidate {quad:?}");
                continue;
            };
            let card = remove_glare(&card, &self.params.glare);
            let Some(nearest) = self.matcher.match_image(&card) else {
                continue;
            };

            let identifier = self
                .matcher
                .accepts(&nearest)
                .then(|| nearest.identifier.to_string());
            let metadata = identifier.as_deref().and_then(|id| self.resolve(id));

            let shown = match identifier.as_deref() {
                Some(id) if state.observe(id) => {
                    panel.show(id, metadata.as_ref());
                    true
                }
                _ => false,
            };

            log::debug!(
                "candidate matched {} at distance {}",
                nearest.identifier,
                nearest.distance
            );
            detections.push(Detection {
                quad,
                identifier,
                distance: nearest.distance,
                metadata,
                shown,
            });
        }

        detections
    }

    fn card_image(&self, frame: &RgbImage, quad: &Quad) -> Option<RgbImage> {
        let view = ColorImageView {
            width: frame.width() as usize,
            height: frame.height() as usize,
            data: frame.as_raw(),
        };
        let card = rectify(&view, quad)?;
        RgbImage::from_raw(
            card.image.width as u32,
            card.image.height as u32,
            card.image.data,
        )
    }

    fn resolve(&self, identifier: &str) -> Option<CardInfo> {
        match self.catalog.lookup(identifier) {
            Ok(info) => Some(info),
            Err(err) => {
                log::warn!("metadata lookup for {identifier} failed: {err}");
                None
            }
        }
    }
}

/// Two pixel axis-aligned rectangle around the quad.
pub fn draw_outline(frame: &mut RgbImage, quad: &Quad) {
    let (x, y, w, h) = quad_bounds(quad);
    draw_hollow_rect_mut(frame, Rect::at(x, y).of_size(w, h), OUTLINE_COLOR);
    draw_hollow_rect_mut(
        frame,
        Rect::at(x - 1, y - 1).of_size(w + 2, h + 2),
        OUTLINE_COLOR,
    );
}
