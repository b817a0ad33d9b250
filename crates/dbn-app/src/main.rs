use eframe::egui::{self, Color32, RichText};
use dbn_lang::{
    Builtins, Canvas, DirOpener, Outcome, Settings, Token, TokenKind,
    evaluate_str, parse, tokenize,
};

const SOURCE_NAME: &str = "playground.dbn";

fn mono_row(ui: &mut egui::Ui, label: &str, value: &str) {
    ui.horizontal(|ui| {
        ui.label(RichText::new(label).monospace().color(Color32::from_rgb(140, 140, 140)));
        ui.label(RichText::new(value).monospace().color(Color32::from_rgb(210, 210, 170)));
    });
}

fn main() -> eframe::Result {
    env_logger::init();
    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default().with_inner_size([1200.0, 760.0]),
        ..Default::default()
    };
    eframe::run_native("DBN Playground", options, Box::new(|_cc| Ok(Box::new(App::default()))))
}

// ─── App state ────────────────────────────────────────────────────────────────

#[derive(PartialEq)]
enum Tab { Canvas, Frames, Errors, Tokens, Ast }

struct App {
    source: String,
    result: RunResult,
    tab: Tab,
    record_frames: bool,
    use_builtins: bool,
    frame_index: usize,
    canvas_texture: Option<egui::TextureHandle>,
    frame_texture: Option<(usize, egui::TextureHandle)>,
}

impl Default for App {
    fn default() -> Self {
        let source = String::from(
"// write dbn code here
Paper 10
Pen 100
Repeat A 20 80 {
  Line 20 A 80 (100 - A)
}
Pen 60
letterD 40 45
letterB 47 45
letterN 54 45
");
        let mut app = Self {
            source,
            result: RunResult::empty(),
            tab: Tab::Canvas,
            record_frames: false,
            use_builtins: true,
            frame_index: 0,
            canvas_texture: None,
            frame_texture: None,
        };
        app.rerun();
        app
    }
}

impl App {
    fn settings(&self) -> Settings {
        // `Load` resolves against the directory the playground was started in.
        let mut settings = Settings::default().with_opener(DirOpener::new("."));
        if self.record_frames {
            settings = settings.with_frames(0);
        }
        if !self.use_builtins {
            settings = settings.with_builtins(Builtins::none());
        }
        settings
    }

    fn rerun(&mut self) {
        self.result = run(&self.source, &self.settings());
        self.canvas_texture = None;
        self.frame_texture = None;
        self.frame_index = self.frame_index.min(self.result.outcome.frames.len().saturating_sub(1));
    }
}

// ─── Run result ───────────────────────────────────────────────────────────────

struct RunResult {
    outcome: Outcome,
    tokens: Vec<Token>,
    /// Canonical rendering and top-level statement count; `None` if parsing failed.
    ast: Option<(String, usize)>,
}

impl RunResult {
    fn empty() -> Self {
        Self {
            outcome: Outcome { canvas: Canvas::square(1), frames: Vec::new(), errors: Vec::new() },
            tokens: Vec::new(),
            ast: None,
        }
    }
}

fn run(source: &str, settings: &Settings) -> RunResult {
    let tokens = tokenize(source, SOURCE_NAME);
    let ast = parse(source, SOURCE_NAME).ok().map(|p| (p.to_string(), p.body.len()));
    let outcome = evaluate_str(source, SOURCE_NAME, settings);
    RunResult { outcome, tokens, ast }
}

fn load_texture(ctx: &egui::Context, name: &str, canvas: &Canvas) -> egui::TextureHandle {
    let image = egui::ColorImage::from_rgba_unmultiplied(
        [canvas.width(), canvas.height()],
        &canvas.to_rgba_bytes(),
    );
    ctx.load_texture(name, image, egui::TextureOptions::NEAREST)
}

// ─── UI ───────────────────────────────────────────────────────────────────────

impl eframe::App for App {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // ── Upload textures for the current result ───────────────────────────
        if self.canvas_texture.is_none() {
            self.canvas_texture = Some(load_texture(ctx, "canvas", &self.result.outcome.canvas));
        }
        let stale = self.frame_texture.as_ref().is_none_or(|(i, _)| *i != self.frame_index);
        if stale {
            if let Some(frame) = self.result.outcome.frames.get(self.frame_index) {
                let texture = load_texture(ctx, "frame", &frame.to_canvas());
                self.frame_texture = Some((self.frame_index, texture));
            }
        }

        egui::CentralPanel::default().show(ctx, |ui| {
            ui.columns(2, |cols| {
                // ── Left: editor ──────────────────────────────────────────────
                cols[0].vertical(|ui| {
                    ui.label("Source");
                    let response = ui.add(
                        egui::TextEdit::multiline(&mut self.source)
                            .font(egui::TextStyle::Monospace)
                            .desired_width(f32::INFINITY)
                            .desired_rows(40),
                    );
                    if response.changed() {
                        self.rerun();
                    }
                });

                // ── Right: output ─────────────────────────────────────────────
                cols[1].vertical(|ui| {
                    // ── Status bar ────────────────────────────────────────────
                    ui.horizontal(|ui| {
                        let error_count = self.result.outcome.errors.len();
                        if error_count == 0 {
                            ui.label(RichText::new("✓  no errors").color(Color32::from_rgb(80, 200, 80)));
                        } else {
                            ui.label(RichText::new(format!("✗  {error_count} error(s)")).color(Color32::from_rgb(220, 80, 80)));
                        }
                        ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                            let builtins = ui.checkbox(&mut self.use_builtins, "builtins").changed();
                            let frames = ui.checkbox(&mut self.record_frames, "record frames").changed();
                            if builtins || frames || ui.button("run").clicked() {
                                self.rerun();
                            }
                        });
                    });

                    ui.separator();

                    // ── Tab bar ───────────────────────────────────────────────
                    ui.horizontal(|ui| {
                        let err_label = if self.result.outcome.errors.is_empty() {
                            "Errors".into()
                        } else {
                            format!("Errors ({})", self.result.outcome.errors.len())
                        };
                        ui.selectable_value(&mut self.tab, Tab::Canvas, "Canvas");
                        ui.selectable_value(&mut self.tab, Tab::Frames, "Frames");
                        ui.selectable_value(&mut self.tab, Tab::Errors, err_label);
                        ui.selectable_value(&mut self.tab, Tab::Tokens, "Tokens");
                        ui.selectable_value(&mut self.tab, Tab::Ast, "AST");
                    });

                    ui.separator();

                    // ── Tab content ───────────────────────────────────────────
                    egui::ScrollArea::vertical().show(ui, |ui| {
                        match self.tab {
                            Tab::Canvas => self.show_canvas(ui),
                            Tab::Frames => self.show_frames(ui),
                            Tab::Errors => self.show_errors(ui),
                            Tab::Tokens => self.show_tokens(ui),
                            Tab::Ast    => self.show_ast(ui),
                        }
                    });
                });
            });
        });
    }
}

impl App {
    fn show_texture(ui: &mut egui::Ui, texture: &egui::TextureHandle) {
        let side = ui.available_width().min(ui.available_height()).max(100.0);
        ui.image((texture.id(), egui::vec2(side, side)));
    }

    fn show_canvas(&self, ui: &mut egui::Ui) {
        if !self.result.outcome.is_clean() {
            ui.label(RichText::new("Program has errors; the canvas may be incomplete.").color(Color32::GRAY));
        }
        if let Some(texture) = &self.canvas_texture {
            Self::show_texture(ui, texture);
        }
    }

    fn show_frames(&mut self, ui: &mut egui::Ui) {
        let count = self.result.outcome.frames.len();
        if count == 0 {
            let msg = if self.record_frames { "No frames captured." } else { "Enable \"record frames\" to capture." };
            ui.label(RichText::new(msg).color(Color32::GRAY));
            return;
        }
        ui.add(egui::Slider::new(&mut self.frame_index, 0..=count - 1).text(format!("of {count}")));
        if let Some((_, texture)) = &self.frame_texture {
            Self::show_texture(ui, texture);
        }
    }

    fn show_errors(&self, ui: &mut egui::Ui) {
        if self.result.outcome.errors.is_empty() {
            ui.label(RichText::new("No errors.").color(Color32::GRAY));
            return;
        }
        for error in &self.result.outcome.errors {
            ui.horizontal(|ui| {
                ui.label(RichText::new(error.code().as_str()).monospace().color(Color32::GRAY));
                ui.label(RichText::new(error.to_string()).monospace().color(Color32::from_rgb(220, 80, 80)));
            });
        }
    }

    fn show_tokens(&self, ui: &mut egui::Ui) {
        egui::Grid::new("tokens_grid")
            .striped(true)
            .min_col_width(60.0)
            .show(ui, |ui| {
                ui.label(RichText::new("at").strong());
                ui.label(RichText::new("kind").strong());
                ui.label(RichText::new("text").strong());
                ui.end_row();

                for tok in &self.result.tokens {
                    let kind_color = match tok.kind {
                        k if k.is_keyword()    => Color32::from_rgb(100, 180, 255),
                        TokenKind::Ident       => Color32::from_rgb(180, 255, 180),
                        TokenKind::Integer     => Color32::from_rgb(255, 200, 80),
                        TokenKind::Illegal     => Color32::from_rgb(220, 80, 80),
                        _                      => Color32::GRAY,
                    };
                    ui.label(RichText::new(format!("{}:{}", tok.pos.line, tok.pos.column)).monospace());
                    ui.label(RichText::new(format!("{:?}", tok.kind)).monospace().color(kind_color));
                    ui.label(RichText::new(tok.text.escape_debug().to_string()).monospace());
                    ui.end_row();
                }
            });
    }

    fn show_ast(&self, ui: &mut egui::Ui) {
        let Some((ast, statements)) = &self.result.ast else {
            ui.label(RichText::new("No AST (parse failed).").color(Color32::GRAY));
            return;
        };
        mono_row(ui, "statements:", &statements.to_string());
        ui.add(
            egui::TextEdit::multiline(&mut ast.clone())
                .font(egui::TextStyle::Monospace)
                .desired_width(f32::INFINITY)
                .interactive(false),
        );
    }
}
