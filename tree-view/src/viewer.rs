//! Interactive pixel tree viewer built with eframe/egui.
//!
//! This module defines [`Viewer`], which owns the current parameters, the
//! generator and the last rendered tree, and implements [`eframe::App`]
//! to edit the parameters and show the result as a zoomed texture.

use crate::export;
use eframe::App;
use egui::emath::Numeric;
use log::{info, warn};
use std::ops::RangeInclusive;
use std::path::PathBuf;
use tree_core::generator::fresh_seed;
use tree_core::params::{
    BranchBudget, CanvasExtent, DepthLimit, GrowthStage, LeafScatter, MagnitudeF32, Season, TreeType,
    UnitF32,
};
use tree_core::{RgbaBuffer, TreeGenerator, TreeMetadata, TreeParameters};

/// Slider range shared by every [`MagnitudeF32`] parameter.
const MAGNITUDE_RANGE: RangeInclusive<f32> = MagnitudeF32::MIN..=MagnitudeF32::MAX;

/// Main application state for the interactive viewer.
///
/// The typical per-frame update is:
/// 1. Build the side panel; any edited parameter marks the tree stale.
/// 2. If the tree is stale, regenerate it and upload a new texture.
/// 3. Draw the texture and the status bar.
///
/// ### Fields
/// - `params` - Parameters being edited; the generator normalizes a copy.
/// - `generator` - Hands out generation ids; carries no seed of its own.
/// - `buffer` - Last rendered image.
/// - `meta` - Metadata of the last generation.
/// - `texture` - GPU copy of `buffer`, rebuilt when `texture_dirty` is set.
/// - `zoom` - Integer-friendly magnification of the texture.
/// - `export_path` - Target of the export button.
/// - `status` - One-line message shown in the status bar.
pub struct Viewer {
    params: TreeParameters,
    generator: TreeGenerator,

    buffer: RgbaBuffer,
    meta: TreeMetadata,

    texture: Option<egui::TextureHandle>,
    texture_dirty: bool,

    zoom: f32,
    export_path: String,
    status: String,
}

impl Viewer {
    /// Creates a viewer and renders `params` immediately.
    ///
    /// A zero seed is replaced by a fresh one so the seed field always
    /// shows the tree on screen.
    pub fn with_parameters(mut params: TreeParameters) -> Self {
        if params.random_seed == 0 {
            params.random_seed = fresh_seed();
        }

        let mut generator = TreeGenerator::default();
        let (buffer, meta) = generator.generate(&params);

        Self {
            params,
            generator,
            buffer,
            meta,
            texture: None,
            texture_dirty: true,
            zoom: 4.0,
            export_path: "tree.ppm".to_owned(),
            status: String::new(),
        }
    }

    /// Renders the current parameters again.
    fn regenerate(&mut self) {
        let (buffer, meta) = self.generator.generate(&self.params);
        self.buffer = buffer;
        self.meta = meta;
        self.texture_dirty = true;
    }

    /// Picks a new seed and regenerates.
    fn randomize_seed(&mut self) {
        self.params.random_seed = fresh_seed();
        self.regenerate();
    }

    /// Replaces the parameters with a preset, keeping seed and canvas size.
    fn apply_preset(&mut self, name: &str) {
        let Some(preset) = TreeParameters::preset(name) else {
            warn!("unknown preset '{name}'");
            return;
        };
        self.params = preset
            .with_canvas(self.params.canvas_width.get(), self.params.canvas_height.get())
            .with_seed(self.params.random_seed);
        self.regenerate();
    }

    /// Writes the current image to `export_path` and reports the outcome.
    fn export(&mut self) {
        let path = PathBuf::from(self.export_path.trim());
        match export::save_ppm(&self.buffer, &path) {
            Ok(()) => {
                info!("exported tree to {}", path.display());
                self.status = format!("saved {}", path.display());
            }
            Err(e) => {
                warn!("export to {} failed: {e}", path.display());
                self.status = format!("export failed: {e}");
            }
        }
    }

    /// Helper to draw a labeled slider for a bounded parameter.
    ///
    /// ### Returns
    /// The new raw value if the user moved the slider.
    fn labeled_slider<T: Numeric>(
        ui: &mut egui::Ui,
        label: &str,
        value: T,
        range: RangeInclusive<T>,
    ) -> Option<T> {
        let mut edited = value;
        let changed = ui.add(egui::Slider::new(&mut edited, range).text(label)).changed();
        changed.then_some(edited)
    }

    /// Builds the top panel (presets, seed, regenerate, export, zoom).
    fn ui_top_panel(&mut self, ctx: &egui::Context) {
        egui::TopBottomPanel::top("top_panel").show(ctx, |ui| {
            ui.horizontal(|ui| {
                for name in ["oak", "pine", "palm", "dead"] {
                    if ui.button(name).clicked() {
                        self.apply_preset(name);
                    }
                }

                ui.separator();
                let mut seed = self.params.random_seed;
                let seed_changed = ui
                    .add(egui::DragValue::new(&mut seed).prefix("seed = ").range(1..=u32::MAX))
                    .changed();
                if seed_changed {
                    self.params.random_seed = seed;
                    self.regenerate();
                }

                if ui.button("Random seed").clicked() {
                    self.randomize_seed();
                }
                if ui.button("Regenerate").clicked() {
                    self.regenerate();
                }

                ui.separator();
                ui.add(egui::TextEdit::singleline(&mut self.export_path).desired_width(120.0));
                if ui.button("Export PPM").clicked() {
                    self.export();
                }

                ui.separator();
                ui.add(egui::Slider::new(&mut self.zoom, 1.0..=12.0).text("Zoom"));
            });
        });
    }

    /// Builds the bottom status bar from the last generation's metadata.
    fn ui_status_bar(&self, ctx: &egui::Context) {
        egui::TopBottomPanel::bottom("status_bar").show(ctx, |ui| {
            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                ui.label(format!(
                    "{:.2} ms",
                    self.meta.generation_time.as_secs_f64() * 1000.0
                ));
                ui.label(format!("depth = {}", self.meta.max_depth));
                ui.label(format!("leaves = {}", self.meta.leaf_count));
                ui.label(format!("branches = {}", self.meta.branch_count));
                ui.label(format!("seed = {}", self.meta.random_seed));
                ui.label(format!("#{}", self.meta.generation_id));
                ui.separator();
                ui.label(&self.status);
            });
        });
    }

    /// Builds the right-hand parameter panel.
    ///
    /// Edits go to a local copy which is written back, and the tree
    /// regenerated, only if something changed.
    fn ui_params_panel(&mut self, ctx: &egui::Context) {
        let mut p = self.params;
        let mut changed = false;

        egui::SidePanel::right("params_panel")
            .resizable(true)
            .default_width(240.0)
            .show(ctx, |ui| {
                egui::ScrollArea::vertical().show(ui, |ui| {
                    ui.heading("Tree");

                    egui::ComboBox::from_label("type")
                        .selected_text(p.tree_type.name())
                        .show_ui(ui, |ui| {
                            for t in TreeType::ALL {
                                changed |= ui.selectable_value(&mut p.tree_type, t, t.name()).changed();
                            }
                        });
                    egui::ComboBox::from_label("growth stage")
                        .selected_text(format!("{:?}", p.growth_stage))
                        .show_ui(ui, |ui| {
                            for s in GrowthStage::ALL {
                                changed |= ui
                                    .selectable_value(&mut p.growth_stage, s, format!("{s:?}"))
                                    .changed();
                            }
                        });
                    egui::ComboBox::from_label("season")
                        .selected_text(format!("{:?}", p.season))
                        .show_ui(ui, |ui| {
                            for s in Season::ALL {
                                changed |= ui
                                    .selectable_value(&mut p.season, s, format!("{s:?}"))
                                    .changed();
                            }
                        });

                    ui.separator();
                    ui.label("Canvas");
                    let extent = CanvasExtent::MIN..=CanvasExtent::MAX;
                    if let Some(v) = Self::labeled_slider(ui, "width", p.canvas_width.get(), extent.clone()) {
                        p.canvas_width.set(v);
                        changed = true;
                    }
                    if let Some(v) = Self::labeled_slider(ui, "height", p.canvas_height.get(), extent) {
                        p.canvas_height.set(v);
                        changed = true;
                    }
                    if let Some(v) = Self::labeled_slider(ui, "scale", p.overall_scale.get(), MAGNITUDE_RANGE) {
                        p.overall_scale.set(v);
                        changed = true;
                    }

                    ui.separator();
                    ui.label("Branches");
                    let unit = UnitF32::MIN..=UnitF32::MAX;
                    let b = &mut p.branches;
                    if let Some(v) = Self::labeled_slider(ui, "thickness", b.base_thickness.get(), MAGNITUDE_RANGE) {
                        b.base_thickness.set(v);
                        changed = true;
                    }
                    if let Some(v) = Self::labeled_slider(ui, "decay", b.thickness_decay.get(), unit.clone()) {
                        b.thickness_decay.set(v);
                        changed = true;
                    }
                    if let Some(v) =
                        Self::labeled_slider(ui, "branching", b.branch_probability.get(), unit.clone())
                    {
                        b.branch_probability.set(v);
                        changed = true;
                    }
                    if let Some(v) = Self::labeled_slider(ui, "angle", b.angle_variation.get(), unit.clone()) {
                        b.angle_variation.set(v);
                        changed = true;
                    }
                    if let Some(v) =
                        Self::labeled_slider(ui, "depth", b.max_depth.get(), DepthLimit::MIN..=DepthLimit::MAX)
                    {
                        b.max_depth.set(v);
                        changed = true;
                    }
                    if let Some(v) = Self::labeled_slider(
                        ui,
                        "budget",
                        b.max_branches.get(),
                        BranchBudget::MIN..=BranchBudget::MAX,
                    ) {
                        b.max_branches.set(v);
                        changed = true;
                    }

                    ui.separator();
                    ui.label("Leaves");
                    let l = &mut p.leaves;
                    if let Some(v) = Self::labeled_slider(ui, "density", l.density.get(), unit.clone()) {
                        l.density.set(v);
                        changed = true;
                    }
                    if let Some(v) = Self::labeled_slider(ui, "size", l.size_base.get(), MAGNITUDE_RANGE) {
                        l.size_base.set(v);
                        changed = true;
                    }
                    if let Some(v) =
                        Self::labeled_slider(ui, "size variation", l.size_variation.get(), unit.clone())
                    {
                        l.size_variation.set(v);
                        changed = true;
                    }
                    if let Some(v) = Self::labeled_slider(ui, "color variation", l.color_variation.get(), unit) {
                        l.color_variation.set(v);
                        changed = true;
                    }
                    if let Some(v) = Self::labeled_slider(ui, "scatter", p.leaf_scatter.get(), LeafScatter::MIN..=LeafScatter::MAX)
                    {
                        p.leaf_scatter.set(v);
                        changed = true;
                    }

                    ui.separator();
                    if ui.button("Reset to defaults").clicked() {
                        p = TreeParameters::default()
                            .with_canvas(p.canvas_width.get(), p.canvas_height.get())
                            .with_seed(p.random_seed);
                        changed = true;
                    }
                });
            });

        if changed {
            self.params = p;
            self.regenerate();
        }
    }

    /// Uploads the buffer as a texture if it changed since the last frame.
    fn sync_texture(&mut self, ctx: &egui::Context) {
        if !self.texture_dirty && self.texture.is_some() {
            return;
        }

        let image = egui::ColorImage::from_rgba_unmultiplied(
            [self.buffer.width(), self.buffer.height()],
            &self.buffer.to_rgba_bytes(),
        );
        match &mut self.texture {
            Some(texture) => texture.set(image, egui::TextureOptions::NEAREST),
            None => {
                self.texture = Some(ctx.load_texture("tree", image, egui::TextureOptions::NEAREST));
            }
        }
        self.texture_dirty = false;
    }

    /// Builds the central panel showing the rendered tree.
    fn ui_central_panel(&mut self, ctx: &egui::Context) {
        self.sync_texture(ctx);

        egui::CentralPanel::default().show(ctx, |ui| {
            let Some(texture) = &self.texture else {
                return;
            };

            let size = egui::vec2(
                self.buffer.width() as f32 * self.zoom,
                self.buffer.height() as f32 * self.zoom,
            );

            // Zoom with the scroll wheel.
            let scroll = ui.ctx().input(|i| i.raw_scroll_delta.y);
            if scroll != 0.0 {
                self.zoom = (self.zoom * (1.0 + scroll * 0.001).clamp(0.5, 2.0)).clamp(1.0, 12.0);
            }

            egui::ScrollArea::both().show(ui, |ui| {
                ui.centered_and_justified(|ui| {
                    ui.add(egui::Image::new(egui::load::SizedTexture::new(texture.id(), size)));
                });
            });
        });
    }
}

impl App for Viewer {
    /// eframe callback that builds all UI panels for each frame.
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.ui_top_panel(ctx);
        self.ui_status_bar(ctx);
        self.ui_params_panel(ctx);
        self.ui_central_panel(ctx);
    }
}
