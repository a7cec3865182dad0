//! Compose row: message input, send, sound and stats toggles.

use eframe::egui;

use super::CanvasApp;

impl CanvasApp {
    pub fn draw_toolbar(&mut self, ui: &mut egui::Ui) {
        ui.horizontal(|ui| {
            ui.add_space(4.0);

            let response = ui.add_sized(
                [ui.available_width() - 150.0, 24.0],
                egui::TextEdit::singleline(&mut self.input)
                    .hint_text("Whisper something into the canvas...")
                    .font(egui::TextStyle::Monospace),
            );

            let submitted = response.lost_focus()
                && ui.input(|i| i.key_pressed(egui::Key::Enter));

            if submitted || ui.button("Send").clicked() {
                self.submit_input();
                response.request_focus();
            }

            let prev_sound = self.sound_on;
            ui.toggle_value(&mut self.sound_on, "\u{266A}");
            if self.sound_on && !prev_sound {
                // Toggling sound on is itself a user gesture.
                self.ensure_audio();
            }

            ui.toggle_value(&mut self.show_stats, "Stats");
        });
    }

    fn submit_input(&mut self) {
        // A submit click/keypress is a user gesture: safe point to start
        // the audio stream.
        self.ensure_audio();

        let now = self.now();
        let text = std::mem::take(&mut self.input);
        if let Some(id) = self.store.submit(&text, now) {
            if self.sound_on {
                if let Some(sig) = self.store.get(id).map(|m| m.signature) {
                    self.audio.play_tone(&sig);
                }
            }
        } else {
            // Blank input is silently rejected; keep whatever was typed.
            self.input = text;
        }
    }
}
