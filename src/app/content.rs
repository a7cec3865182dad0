//! The orb field canvas and the decrypt overlay.
//!
//! Orbs are painted by hand: project each message's world position
//! through the orbit camera, depth-sort, and draw its shape silhouette
//! with the egui painter. The inspection overlay is painted the same way
//! (background, accent scanline, corner brackets) with two interactive
//! rects layered on top: the press-and-hold decrypt button and a close
//! button.

use eframe::egui;

use crate::encode::{self, Shape, Signature};
use crate::scene::{self, DecryptHold, PickTarget};

use super::CanvasApp;

/// Orb radius in world units; apparent size comes from the projection.
const ORB_WORLD_RADIUS: f32 = 0.55;

const STAR_COUNT: u32 = 150;

/// Typewriter reveal rate, characters per second.
const REVEAL_CPS: f64 = 28.0;

struct DrawnOrb {
    id: u64,
    center: egui::Pos2,
    radius: f32,
    depth: f32,
    signature: Signature,
    highlighted: bool,
    alpha: f32,
    spawn_age: f64,
}

impl CanvasApp {
    pub fn draw_content(&mut self, ui: &mut egui::Ui, now: f64) {
        let response = ui.allocate_response(
            ui.available_size(),
            egui::Sense::click_and_drag().union(egui::Sense::hover()),
        );
        let rect = response.rect;
        let painter = ui.painter_at(rect);

        // Background + star field.
        painter.rect_filled(rect, 0.0, egui::Color32::from_rgb(7, 9, 18));
        for i in 0..STAR_COUNT {
            let ([sx, sy], brightness) = scene::star(i);
            // Slow parallax against the camera azimuth.
            let x = (sx + self.cam.azimuth * 0.01).rem_euclid(1.0);
            let twinkle = 0.75 + ((now * 1.3) as f32 + i as f32 * 0.9).sin() * 0.25;
            let level = (brightness * twinkle * 190.0) as u8;
            painter.circle_filled(
                egui::pos2(rect.left() + x * rect.width(), rect.top() + sy * rect.height()),
                if brightness > 0.8 { 1.4 } else { 0.9 },
                egui::Color32::from_rgb(level, level, level.saturating_add(20)),
            );
        }

        let overlay_rect = self.selected.map(|_| overlay_rect_for(rect));
        let pointer_over_overlay = overlay_rect
            .zip(ui.input(|i| i.pointer.interact_pos()))
            .map_or(false, |(r, p)| r.contains(p));

        // Camera: drag to orbit, scroll to dolly.
        if response.dragged() && !pointer_over_overlay {
            let delta = response.drag_delta();
            self.cam.rotate(delta.x, delta.y);
        }
        if response.hovered() {
            let scroll = ui.input(|i| i.raw_scroll_delta.y);
            if scroll.abs() > 0.1 {
                self.cam.dolly(-scroll);
            }
        }

        // Project every message.
        let aspect = rect.width() / rect.height();
        let half_h = rect.height() * 0.5;
        let tan_half = (scene::FOV * 0.5).tan();
        let mut drawn: Vec<DrawnOrb> = Vec::new();

        for m in self.store.messages() {
            let age = now - m.spawned_at;
            let progress = if m.spawn_pending {
                scene::spawn_progress(age)
            } else {
                1.0
            };
            let mut world = scene::spawn_position(m.home, progress);
            world[1] += scene::float_offset(now, scene::orb_phase(m.id));

            let Some(p) = scene::project(world, &self.cam, aspect) else {
                continue;
            };
            if scene::off_screen(&p) {
                continue;
            }

            let scale = scene::pulse_scale(now, m.signature.speed, m.highlighted);
            let px_per_world = half_h / (p.depth * tan_half);
            let radius = (ORB_WORLD_RADIUS * scale * px_per_world).clamp(2.0, 140.0);

            drawn.push(DrawnOrb {
                id: m.id,
                center: egui::pos2(
                    rect.center().x + p.ndc[0] * rect.width() * 0.5,
                    rect.center().y + p.ndc[1] * half_h,
                ),
                radius,
                depth: p.depth,
                signature: m.signature,
                highlighted: m.highlighted,
                alpha: progress,
                spawn_age: age,
            });
        }

        // Far orbs first.
        drawn.sort_by(|a, b| b.depth.total_cmp(&a.depth));

        for orb in &drawn {
            draw_orb(&painter, orb, now, self.selected == Some(orb.id));
        }

        // Click: pick an orb or deselect on empty space. Clicks on the
        // overlay belong to its own widgets.
        if response.clicked() && !pointer_over_overlay {
            if let Some(pos) = response.interact_pointer_pos() {
                let click_ndc = [
                    (pos.x - rect.center().x) / (rect.width() * 0.5),
                    (pos.y - rect.center().y) / half_h,
                ];
                let targets: Vec<PickTarget> = drawn
                    .iter()
                    .map(|o| PickTarget {
                        id: o.id,
                        projected: scene::Projected {
                            ndc: [
                                (o.center.x - rect.center().x) / (rect.width() * 0.5),
                                (o.center.y - rect.center().y) / half_h,
                            ],
                            depth: o.depth,
                        },
                        hit_radius: o.radius / half_h + 0.02,
                    })
                    .collect();

                self.ensure_audio();
                match scene::pick(click_ndc, &targets) {
                    Some(id) => {
                        self.select(id);
                        self.store.trigger_highlight(id, now);
                        if self.sound_on {
                            if let Some(sig) = self.store.get(id).map(|m| m.signature) {
                                self.audio.play_tone(&sig);
                            }
                        }
                    }
                    None => self.deselect(),
                }
            }
        }

        if let Some(id) = self.selected {
            self.draw_overlay(ui, &painter, rect, id, now);
        }

        // Usage hint, bottom-left.
        painter.text(
            rect.left_bottom() + egui::vec2(8.0, -8.0),
            egui::Align2::LEFT_BOTTOM,
            "Drag: orbit | Scroll: zoom | Click an orb to inspect",
            egui::FontId::proportional(12.0),
            egui::Color32::from_rgba_unmultiplied(150, 155, 175, 160),
        );
    }

    fn draw_overlay(
        &mut self,
        ui: &mut egui::Ui,
        painter: &egui::Painter,
        rect: egui::Rect,
        id: u64,
        now: f64,
    ) {
        let Some((text, sig)) = self.store.get(id).map(|m| (m.text.clone(), m.signature))
        else {
            self.deselect();
            return;
        };

        let panel = overlay_rect_for(rect);
        let [r, g, b] = encode::color_rgb(sig.color);
        let accent = egui::Color32::from_rgb(r, g, b);

        // Glow shadow + main background.
        painter.rect_filled(
            panel.expand(3.0),
            6.0,
            egui::Color32::from_rgba_unmultiplied(r, g, b, 26),
        );
        painter.rect(
            panel,
            4.0,
            egui::Color32::from_rgba_unmultiplied(12, 15, 30, 240),
            egui::Stroke::new(1.5, egui::Color32::from_rgba_unmultiplied(r, g, b, 180)),
        );

        // Top scanline accent.
        painter.rect_filled(
            egui::Rect::from_min_size(panel.left_top(), egui::vec2(panel.width(), 2.0)),
            0.0,
            accent,
        );

        // Corner brackets.
        let bk = 12.0;
        let stroke = egui::Stroke::new(1.5, accent);
        for (corner, dx, dy) in [
            (panel.left_top(), 1.0, 1.0),
            (panel.right_top(), -1.0, 1.0),
            (panel.left_bottom(), 1.0, -1.0),
            (panel.right_bottom(), -1.0, -1.0),
        ] {
            painter.line_segment([corner, corner + egui::vec2(dx * bk, 0.0)], stroke);
            painter.line_segment([corner, corner + egui::vec2(0.0, dy * bk)], stroke);
        }

        let left = panel.left() + 16.0;
        let mut y = panel.top() + 12.0;

        // Header: dot + category + hash badge.
        painter.circle_filled(egui::pos2(left + 2.0, y + 6.0), 5.0, accent);
        let category = sig.category.unwrap_or("UNCLASSIFIED");
        painter.text(
            egui::pos2(left + 12.0, y),
            egui::Align2::LEFT_TOP,
            category,
            egui::FontId::proportional(12.0),
            accent,
        );
        painter.text(
            egui::pos2(panel.right() - 40.0, y),
            egui::Align2::RIGHT_TOP,
            format!("#{:08x}", sig.hash as u32),
            egui::FontId::monospace(11.0),
            egui::Color32::from_rgba_unmultiplied(r, g, b, 150),
        );
        y += 24.0;

        // Separator.
        painter.line_segment(
            [egui::pos2(left, y), egui::pos2(panel.right() - 16.0, y)],
            egui::Stroke::new(0.5, egui::Color32::from_rgba_unmultiplied(r, g, b, 60)),
        );
        y += 8.0;

        // Body: obscured glyphs, or the typewriter reveal.
        let body = match self.revealed_at {
            Some(start) => {
                let visible = ((now - start) * REVEAL_CPS).max(0.0) as usize;
                text.chars().take(visible).collect::<String>()
            }
            None => encode::obscured_text(&text, sig.hash),
        };
        let body_color = if self.revealed_at.is_some() {
            egui::Color32::from_rgb(235, 235, 245)
        } else {
            egui::Color32::from_rgba_unmultiplied(r, g, b, 200)
        };
        painter.text(
            egui::pos2(left, y),
            egui::Align2::LEFT_TOP,
            &body,
            egui::FontId::monospace(15.0),
            body_color,
        );

        // Close button.
        let close_rect = egui::Rect::from_min_size(
            panel.right_top() + egui::vec2(-26.0, 6.0),
            egui::vec2(20.0, 20.0),
        );
        let close = ui.interact(close_rect, ui.id().with("overlay_close"), egui::Sense::click());
        painter.text(
            close_rect.center(),
            egui::Align2::CENTER_CENTER,
            "\u{2715}",
            egui::FontId::proportional(13.0),
            if close.hovered() {
                egui::Color32::WHITE
            } else {
                egui::Color32::from_rgba_unmultiplied(200, 200, 210, 180)
            },
        );
        if close.clicked() {
            self.deselect();
            return;
        }

        // Hold-to-decrypt button, unless already revealed.
        if self.revealed_at.is_none() {
            let btn_rect = egui::Rect::from_min_size(
                egui::pos2(left, panel.bottom() - 34.0),
                egui::vec2(170.0, 22.0),
            );
            let btn = ui.interact(
                btn_rect,
                ui.id().with("decrypt_hold"),
                egui::Sense::click_and_drag(),
            );

            if btn.is_pointer_button_down_on() {
                let hold = self.hold.get_or_insert_with(|| DecryptHold::begin(now));
                if hold.complete(now) {
                    self.revealed_at = Some(now);
                    self.hold = None;
                    if self.sound_on {
                        self.audio.play_chime(&sig);
                    }
                }
            } else {
                // Early release aborts: progress resets to zero.
                self.hold = None;
            }

            let progress = self.hold.map_or(0.0, |h| h.progress(now));
            painter.rect(
                btn_rect,
                3.0,
                egui::Color32::from_rgba_unmultiplied(r, g, b, 30),
                egui::Stroke::new(1.0, egui::Color32::from_rgba_unmultiplied(r, g, b, 160)),
            );
            if progress > 0.0 {
                let fill = egui::Rect::from_min_size(
                    btn_rect.min,
                    egui::vec2(btn_rect.width() * progress, btn_rect.height()),
                );
                painter.rect_filled(
                    fill,
                    3.0,
                    egui::Color32::from_rgba_unmultiplied(r, g, b, 110),
                );
            }
            painter.text(
                btn_rect.center(),
                egui::Align2::CENTER_CENTER,
                "HOLD TO DECRYPT",
                egui::FontId::proportional(11.0),
                egui::Color32::from_rgb(230, 230, 240),
            );
        }
    }
}

/// Overlay panel placement: centered near the bottom of the canvas.
fn overlay_rect_for(rect: egui::Rect) -> egui::Rect {
    let w = 440.0_f32.min(rect.width() - 32.0);
    let h = 132.0_f32;
    egui::Rect::from_min_size(
        egui::pos2(rect.center().x - w * 0.5, rect.bottom() - h - 28.0),
        egui::vec2(w, h),
    )
}

/// Paint one orb: shape silhouette with distort wobble, material-driven
/// stroke, highlight ring, selection marker.
fn draw_orb(painter: &egui::Painter, orb: &DrawnOrb, now: f64, selected: bool) {
    let sig = &orb.signature;
    let [r, g, b] = encode::color_rgb(sig.color);
    let alpha = (orb.alpha * 255.0) as u8;
    let fill = egui::Color32::from_rgba_unmultiplied(r, g, b, alpha.min(210));
    let spin = scene::spin(now, sig.speed) + scene::orb_phase(orb.id) * 0.3;

    match sig.shape {
        Shape::Torus => {
            // Ring: thick stroke, hollow center.
            let width = (orb.radius * 0.4).max(1.5);
            painter.circle_stroke(
                orb.center,
                orb.radius * 0.8,
                egui::Stroke::new(width, fill),
            );
        }
        shape => {
            let sides: usize = match shape {
                Shape::Sphere => 24,
                Shape::Icosahedron => 6,
                Shape::TorusKnot => 10,
                Shape::Cube => 4,
                Shape::Octahedron => 4,
                // Fallback silhouette for anything unhandled.
                _ => 24,
            };
            let angle_offset = if shape == Shape::Cube {
                std::f32::consts::FRAC_PI_4
            } else {
                0.0
            };

            let points: Vec<egui::Pos2> = (0..sides)
                .map(|i| {
                    let a = spin + angle_offset
                        + i as f32 / sides as f32 * std::f32::consts::TAU;
                    let mut radius = orb.radius * scene::wobble(sig.distort, now, sig.speed, i);
                    // Knot silhouette: alternate spikes.
                    if shape == Shape::TorusKnot && i % 2 == 1 {
                        radius *= 0.62;
                    }
                    egui::pos2(
                        orb.center.x + a.cos() * radius,
                        orb.center.y + a.sin() * radius,
                    )
                })
                .collect();

            let stroke_alpha = (orb.alpha * (120.0 + sig.metalness * 135.0)) as u8;
            painter.add(egui::Shape::convex_polygon(
                points,
                fill,
                egui::Stroke::new(
                    1.0 + sig.metalness * 1.5,
                    egui::Color32::from_rgba_unmultiplied(
                        r.saturating_add(40),
                        g.saturating_add(40),
                        b.saturating_add(40),
                        stroke_alpha,
                    ),
                ),
            ));
        }
    }

    // Soft core glow; matte (rough) orbs get less of it.
    let glow = ((1.0 - sig.roughness) * 70.0 * orb.alpha) as u8;
    painter.circle_filled(
        orb.center,
        orb.radius * 0.45,
        egui::Color32::from_rgba_unmultiplied(255, 255, 255, glow),
    );

    // Resonance highlight ring.
    if orb.highlighted {
        let pulse = ((now * 6.0).sin() * 0.5 + 0.5) as f32;
        painter.circle_stroke(
            orb.center,
            orb.radius * (1.45 + pulse * 0.2),
            egui::Stroke::new(
                2.0,
                egui::Color32::from_rgba_unmultiplied(r, g, b, 90 + (pulse * 120.0) as u8),
            ),
        );
    }

    // Selection marker.
    if selected {
        painter.circle_stroke(
            orb.center,
            orb.radius * 1.25,
            egui::Stroke::new(1.0, egui::Color32::from_rgba_unmultiplied(255, 255, 255, 170)),
        );
    }

    // A freshly spawned orb leaves a brief trail glint.
    if orb.spawn_age < scene::SPAWN_DURATION && orb.alpha < 1.0 {
        painter.circle_filled(
            orb.center,
            orb.radius * 0.2,
            egui::Color32::from_rgba_unmultiplied(255, 255, 255, 120),
        );
    }
}
