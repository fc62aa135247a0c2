mod audio;
mod controller;
mod game;
mod util;

use eframe::egui;
use eframe::egui::{Align2, Color32, FontId, RichText, Rounding, Sense, Stroke};
use tracing_subscriber::EnvFilter;

use audio::output::OutputSink;
use audio::{AudioSettings, MutedSink, SoundSink};
use controller::{Command, GameController, TITLE};
use game::Player;
use util::board_transform::BoardTransform;

const WINNING_FILL: Color32 = Color32::from_rgba_premultiplied(90, 75, 0, 90);
const GRID_STROKE: Color32 = Color32::from_gray(100);

fn main() -> eframe::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let settings = AudioSettings::from_env();
    let native_options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_title(TITLE)
            .with_inner_size([420.0, 560.0])
            .with_min_inner_size([260.0, 360.0]),
        ..Default::default()
    };
    eframe::run_native(
        TITLE,
        native_options,
        Box::new(move |cc| Box::new(TatetiApp::new(cc, &settings))),
    )
}

/// The only visual turn cue besides the label itself, so X and O must keep these colors.
fn player_color(player: Player) -> Color32 {
    match player {
        Player::X => Color32::RED,
        Player::O => Color32::BLUE,
    }
}

/// Input that counts as the player interacting with the page: a click, a key press, or the
/// start of a touch.
fn is_user_interaction(event: &egui::Event) -> bool {
    matches!(
        event,
        egui::Event::PointerButton { pressed: false, .. }
            | egui::Event::Key { pressed: true, .. }
            | egui::Event::Touch {
                phase: egui::TouchPhase::Start,
                ..
            }
    )
}

struct TatetiApp {
    controller: GameController<Box<dyn SoundSink>>,
    hovered_cell: Option<usize>,
}

impl TatetiApp {
    fn new(_cc: &eframe::CreationContext<'_>, settings: &AudioSettings) -> Self {
        let sink: Box<dyn SoundSink> = match OutputSink::open(settings) {
            Ok(sink) => Box::new(sink),
            Err(err) => {
                tracing::warn!("audio output unavailable, continuing without sound: {err}");
                Box::new(MutedSink)
            }
        };
        Self {
            controller: GameController::new(sink),
            hovered_cell: None,
        }
    }

    fn header(&self, ui: &mut egui::Ui, commands: &mut Vec<Command>) {
        let display = self.controller.display();
        let title_color = if display.title_highlighted {
            Color32::RED
        } else {
            ui.visuals().strong_text_color()
        };
        ui.vertical_centered(|ui| {
            let title = egui::Label::new(RichText::new(display.title).heading().color(title_color))
                .sense(Sense::click());
            if ui.add(title).clicked() {
                commands.push(Command::TitleClicked);
            }
        });
        ui.horizontal(|ui| {
            ui.label("Turn:");
            ui.label(
                RichText::new(display.current_player.symbol())
                    .strong()
                    .color(player_color(display.current_player)),
            );
            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                ui.label(RichText::new(&display.status).strong());
            });
        });
        ui.horizontal(|ui| {
            ui.label(RichText::new(format!("X: {}", display.score_x)).color(player_color(Player::X)));
            ui.separator();
            ui.label(RichText::new(format!("O: {}", display.score_o)).color(player_color(Player::O)));
        });
    }

    fn controls(&self, ui: &mut egui::Ui, commands: &mut Vec<Command>) {
        ui.horizontal(|ui| {
            if ui.button("Reset").clicked() {
                commands.push(Command::ResetRound);
            }
            if ui.button("New Game").clicked() {
                commands.push(Command::NewGame);
            }
            if !self.controller.audio_unlocked() {
                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    ui.weak("click anywhere to enable sound");
                });
            }
        });
    }

    fn paint_board(&mut self, ui: &mut egui::Ui, commands: &mut Vec<Command>) {
        let rect = ui.max_rect();
        let response = ui.allocate_rect(rect, Sense::click());
        let board_to_screen = BoardTransform::new_letterboxed(rect);
        let painter = ui.painter_at(rect);

        let hovered = response
            .hover_pos()
            .and_then(|pos| board_to_screen.cell_at(pos));
        if hovered != self.hovered_cell {
            if let Some(index) = self.hovered_cell {
                commands.push(Command::CellHoverExit(index));
            }
            if let Some(index) = hovered {
                commands.push(Command::CellHoverEnter(index));
            }
            self.hovered_cell = hovered;
        }
        if response.clicked() {
            if let Some(index) = response
                .interact_pointer_pos()
                .and_then(|pos| board_to_screen.cell_at(pos))
            {
                commands.push(Command::CellPressed(index));
            }
        }

        let visuals = ui.visuals();
        let gap = board_to_screen.map_dist(0.04);
        let rounding = Rounding::same(board_to_screen.map_dist(0.08));
        let font = FontId::proportional(board_to_screen.map_dist(0.6));

        painter.rect_filled(
            board_to_screen.board_rect().expand(gap),
            rounding,
            visuals.faint_bg_color,
        );

        for (index, cell) in self.controller.display().cells.iter().enumerate() {
            let cell_rect = board_to_screen.cell_rect(index).shrink(gap);
            let fill = if cell.winning {
                WINNING_FILL
            } else if hovered == Some(index) && cell.mark.is_none() {
                visuals.widgets.hovered.weak_bg_fill
            } else {
                visuals.extreme_bg_color
            };
            painter.rect(cell_rect, rounding, fill, Stroke::new(1.0, GRID_STROKE));
            if let Some(player) = cell.mark {
                painter.text(
                    cell_rect.center(),
                    Align2::CENTER_CENTER,
                    player.symbol(),
                    font.clone(),
                    player_color(player),
                );
            }
        }
    }
}

impl eframe::App for TatetiApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        let mut commands = Vec::new();

        egui::TopBottomPanel::top("header").show(ctx, |ui| self.header(ui, &mut commands));
        egui::TopBottomPanel::bottom("controls").show(ctx, |ui| self.controls(ui, &mut commands));
        egui::CentralPanel::default().show(ctx, |ui| self.paint_board(ui, &mut commands));

        // Page-level listeners see an event after the widget that received it.
        if ctx.input(|i| i.events.iter().any(is_user_interaction)) {
            commands.push(Command::UserInteraction);
        }

        if !commands.is_empty() {
            for command in commands {
                self.controller.handle(command);
            }
            ctx.request_repaint();
        }
    }
}
