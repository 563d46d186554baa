use std::sync::mpsc::{self, Receiver, Sender};
use std::time::{Duration, Instant};

use eframe::egui::{self, Align, Id, RichText, ScrollArea, TextFormat};
use linkshelf_core::browser::{Action, Browser, BrowserOptions};
use linkshelf_core::config::Config;
use linkshelf_core::content::ContentBlock;
use linkshelf_core::nav::NavRow;
use linkshelf_core::prefs::PreferenceStore;
use linkshelf_core::probe::{self, AnnotationSummary, HttpProber, Startup};
use linkshelf_core::search::{highlight, ResultKind, SearchKey};
use linkshelf_core::theme::{apply_theme, Palette, Theme};
use linkshelf_core::tree::{FolderId, LinkTree};
use tracing::{error, info, warn};

use crate::style::{self, Colors};

const SEARCH_INPUT_ID: &str = "search_input";
const NAV_INDENT: f32 = 14.0;
const SPINNER_FRAMES: [char; 4] = ['|', '/', '-', '\\'];

enum InternalEvent {
    ProbeDone {
        tree: LinkTree,
        summary: AnnotationSummary,
        checked_at: u64,
    },
    ProbeFailed(String),
}

pub struct AppInit {
    pub config: Config,
    pub prefs: PreferenceStore,
    pub startup: Startup,
}

pub struct LinkshelfApp {
    config: Config,
    browser: Browser,
    prefs: PreferenceStore,

    theme: Theme,
    palette: Palette,
    style_dirty: bool,

    query: String,
    request_focus_input: bool,
    pending_scroll: Option<FolderId>,
    input_rect: Option<egui::Rect>,
    dropdown_rect: Option<egui::Rect>,

    probe_in_progress: bool,
    status: String,
    spinner_index: usize,
    last_spinner_tick: Instant,

    internal_tx: Sender<InternalEvent>,
    internal_rx: Receiver<InternalEvent>,
}

impl LinkshelfApp {
    pub fn new(_cc: &eframe::CreationContext<'_>, init: AppInit) -> Self {
        let AppInit {
            config,
            prefs,
            startup,
        } = init;
        let theme = prefs
            .theme()
            .unwrap_or_else(|| config.appearance.default_theme.into());
        let (internal_tx, internal_rx) = mpsc::channel();

        let mut app = Self {
            browser: Browser::new(startup.tree, BrowserOptions::from(&config)),
            config,
            prefs,
            theme,
            palette: apply_theme(theme),
            style_dirty: true,
            query: String::new(),
            request_focus_input: true,
            pending_scroll: None,
            input_rect: None,
            dropdown_rect: None,
            probe_in_progress: false,
            status: String::new(),
            spinner_index: 0,
            last_spinner_tick: Instant::now(),
            internal_tx,
            internal_rx,
        };

        if startup.probe {
            app.start_probe();
        }
        app
    }

    fn start_probe(&mut self) {
        if self.probe_in_progress {
            return;
        }

        self.probe_in_progress = true;
        self.spinner_index = 0;
        self.last_spinner_tick = Instant::now();
        self.status = "Checking links... |".to_string();

        let tx = self.internal_tx.clone();
        let mut tree = self.browser.tree().clone();
        let timeout = Duration::from_secs(self.config.accessibility.timeout_secs);

        let spawn = std::thread::Builder::new()
            .name("linkshelf-probe".to_string())
            .spawn(move || {
                let prober = match HttpProber::new(timeout) {
                    Ok(prober) => prober,
                    Err(err) => {
                        let _ = tx.send(InternalEvent::ProbeFailed(err.to_string()));
                        return;
                    }
                };
                let summary = probe::annotate(&mut tree, &prober);
                let _ = tx.send(InternalEvent::ProbeDone {
                    tree,
                    summary,
                    checked_at: probe::now_millis(),
                });
            });

        if let Err(err) = spawn {
            let _ = self
                .internal_tx
                .send(InternalEvent::ProbeFailed(err.to_string()));
        }
    }

    fn handle_internal_events(&mut self) {
        while let Ok(event) = self.internal_rx.try_recv() {
            match event {
                InternalEvent::ProbeDone {
                    tree,
                    summary,
                    checked_at,
                } => {
                    if let Err(err) = self.prefs.store_snapshot(&tree, checked_at) {
                        error!(%err, "could not cache annotated tree");
                    }
                    self.browser.replace_tree(tree);
                    self.probe_in_progress = false;
                    self.status = format!(
                        "{} of {} links reachable",
                        summary.accessible, summary.checked
                    );
                }
                InternalEvent::ProbeFailed(reason) => {
                    warn!(%reason, "accessibility check did not run");
                    self.probe_in_progress = false;
                    self.status = "Link check failed".to_string();
                }
            }
        }
    }

    fn tick_spinner(&mut self) {
        if !self.probe_in_progress {
            return;
        }
        if self.last_spinner_tick.elapsed() >= Duration::from_millis(120) {
            self.spinner_index = (self.spinner_index + 1) % SPINNER_FRAMES.len();
            self.status = format!("Checking links... {}", SPINNER_FRAMES[self.spinner_index]);
            self.last_spinner_tick = Instant::now();
        }
    }

    fn toggle_theme(&mut self) {
        self.theme = self.theme.toggled();
        self.palette = apply_theme(self.theme);
        self.prefs.set_theme(self.theme);
        self.style_dirty = true;
        info!(theme = self.theme.as_str(), "theme changed");
    }

    fn perform(&mut self, ctx: &egui::Context, action: Action) {
        match action {
            Action::RevealFolder(id) => {
                self.pending_scroll = Some(id);
            }
            Action::OpenUrl(url) => {
                info!(%url, "opening link");
                ctx.open_url(egui::OpenUrl::new_tab(url));
            }
        }
    }

    fn handle_search_keyboard(&mut self, ctx: &egui::Context) {
        if ctx.input(|i| i.modifiers.command && i.key_pressed(egui::Key::F)) {
            self.request_focus_input = true;
        }
        if !self.browser.search().is_open() {
            return;
        }

        let keys = [
            (egui::Key::ArrowDown, SearchKey::ArrowDown),
            (egui::Key::ArrowUp, SearchKey::ArrowUp),
            (egui::Key::Enter, SearchKey::Enter),
            (egui::Key::Escape, SearchKey::Escape),
        ];
        for (key, search_key) in keys {
            if ctx.input(|i| i.key_pressed(key)) {
                if let Some(action) = self.browser.handle_key(search_key) {
                    self.perform(ctx, action);
                }
            }
        }
    }

    fn draw_top_bar(&mut self, ctx: &egui::Context) {
        egui::TopBottomPanel::top("top").show(ctx, |ui| {
            ui.add_space(6.0);
            ui.horizontal(|ui| {
                let toggle = ui
                    .button(self.theme.toggle_glyph())
                    .on_hover_text("Toggle theme");
                if toggle.clicked() {
                    self.toggle_theme();
                }

                if !self.status.is_empty() {
                    ui.label(RichText::new(&self.status).weak());
                }

                let input_id = Id::new(SEARCH_INPUT_ID);
                let response = ui.add(
                    egui::TextEdit::singleline(&mut self.query)
                        .id(input_id)
                        .hint_text("Search folders and links")
                        .desired_width(f32::INFINITY),
                );
                if self.request_focus_input {
                    response.request_focus();
                    self.request_focus_input = false;
                }
                if response.changed() {
                    self.browser.set_query(&self.query);
                }
                if response.gained_focus() {
                    self.browser.focus_search();
                }
                self.input_rect = Some(response.rect);
            });
            ui.add_space(6.0);
        });
    }

    fn draw_dropdown(&mut self, ctx: &egui::Context) {
        let Some(anchor) = self.input_rect else {
            return;
        };
        if !self.browser.search().is_open() {
            self.dropdown_rect = None;
            return;
        }

        let colors = Colors::from_palette(&self.palette);
        let query = self.query.clone();
        let current = self.browser.search().current_index();
        let results = self.browser.search().results().to_vec();
        let mut clicked = None;

        let area = egui::Area::new(Id::new("search_dropdown"))
            .order(egui::Order::Foreground)
            .fixed_pos(anchor.left_bottom() + egui::vec2(0.0, 4.0))
            .show(ctx, |ui| {
                egui::Frame::popup(ui.style()).show(ui, |ui| {
                    ui.set_width(anchor.width());
                    if results.is_empty() {
                        ui.label(RichText::new("No matches").color(colors.hint));
                        return;
                    }
                    ScrollArea::vertical().max_height(360.0).show(ui, |ui| {
                        for (index, result) in results.iter().enumerate() {
                            let mut job = egui::text::LayoutJob::default();
                            let marker = match result.kind {
                                ResultKind::Folder => "📁 ",
                                ResultKind::Link => "🔗 ",
                            };
                            job.append(marker, 0.0, TextFormat::default());
                            for span in highlight(&result.title, &query) {
                                job.append(
                                    &span.text,
                                    0.0,
                                    TextFormat {
                                        color: colors.text,
                                        background: if span.emphasized {
                                            colors.highlight
                                        } else {
                                            egui::Color32::TRANSPARENT
                                        },
                                        ..Default::default()
                                    },
                                );
                            }
                            if let Some(url) = &result.url {
                                job.append(
                                    &format!("  {url}"),
                                    0.0,
                                    TextFormat {
                                        color: colors.hint,
                                        ..Default::default()
                                    },
                                );
                            }

                            let is_current = current == index as isize;
                            let response = egui::Frame::NONE
                                .fill(if is_current {
                                    colors.selected_row
                                } else {
                                    egui::Color32::TRANSPARENT
                                })
                                .show(ui, |ui| {
                                    ui.add(egui::Label::new(job).sense(egui::Sense::click()))
                                })
                                .inner;
                            if is_current {
                                response.scroll_to_me(Some(Align::Center));
                            }
                            if response.clicked() {
                                clicked = Some(index);
                            }
                        }
                    });
                });
            });
        self.dropdown_rect = Some(area.response.rect);

        if let Some(index) = clicked {
            if let Some(action) = self.browser.click_result(index) {
                self.perform(ctx, action);
            }
        }
    }

    fn handle_click_outside(&mut self, ctx: &egui::Context) {
        if !self.browser.search().is_open() {
            return;
        }
        let Some(pos) = ctx.input(|i| {
            if i.pointer.any_click() {
                i.pointer.interact_pos()
            } else {
                None
            }
        }) else {
            return;
        };
        let inside = |rect: Option<egui::Rect>| rect.is_some_and(|r| r.contains(pos));
        if !inside(self.input_rect) && !inside(self.dropdown_rect) {
            self.browser.click_outside();
        }
    }

    fn draw_navigation(&mut self, ctx: &egui::Context) {
        let view = self.browser.nav_view();
        let colors = Colors::from_palette(&self.palette);
        let mut clicked_header = None;
        let mut scrolled = false;

        egui::SidePanel::left("navigation")
            .resizable(true)
            .default_width(260.0)
            .show(ctx, |ui| {
                ScrollArea::vertical().show(ui, |ui| {
                    for row in &view.rows {
                        match row {
                            NavRow::Folder {
                                id,
                                title,
                                depth,
                                indicator,
                                interactive,
                                active,
                                highlighted,
                            } => {
                                let label = match indicator {
                                    Some(indicator) => format!("{} {title}", indicator.glyph()),
                                    None => title.clone(),
                                };
                                let mut text = RichText::new(label);
                                if *highlighted {
                                    text = text.background_color(colors.highlight);
                                }
                                let response = ui
                                    .horizontal(|ui| {
                                        ui.add_space((*depth - 1) as f32 * NAV_INDENT);
                                        if *interactive {
                                            ui.selectable_label(*active, text)
                                        } else {
                                            ui.label(text)
                                        }
                                    })
                                    .inner;
                                if response.clicked() {
                                    clicked_header = Some(id.clone());
                                }
                                if self.pending_scroll.as_ref() == Some(id) {
                                    response.scroll_to_me(Some(Align::Center));
                                    scrolled = true;
                                }
                            }
                            NavRow::Link {
                                title, url, depth, ..
                            } => {
                                ui.horizontal(|ui| {
                                    ui.add_space((*depth - 1) as f32 * NAV_INDENT);
                                    ui.hyperlink_to(title.as_str(), url);
                                });
                            }
                        }
                    }
                });
            });

        if scrolled {
            self.pending_scroll = None;
        }
        if let Some(id) = clicked_header {
            self.browser.click_header(&id);
        }
    }

    fn draw_content(&mut self, ctx: &egui::Context) {
        let view = self.browser.content_view();
        let colors = Colors::from_palette(&self.palette);
        let font_size = self.config.appearance.font_size;

        egui::CentralPanel::default().show(ctx, |ui| {
            if let Some(placeholder) = &view.placeholder {
                ui.centered_and_justified(|ui| {
                    ui.label(RichText::new(placeholder).color(colors.hint));
                });
                return;
            }
            ScrollArea::vertical().show(ui, |ui| {
                for block in &view.blocks {
                    match block {
                        ContentBlock::Heading {
                            title,
                            level,
                            indent,
                            ..
                        } => {
                            ui.add_space(4.0);
                            ui.horizontal(|ui| {
                                ui.add_space(*indent);
                                ui.label(
                                    RichText::new(title)
                                        .size(style::heading_size(font_size, *level))
                                        .strong(),
                                );
                            });
                        }
                        ContentBlock::Link {
                            title,
                            url,
                            glyph,
                            indent,
                            ..
                        } => {
                            ui.horizontal(|ui| {
                                ui.add_space(*indent + 12.0);
                                ui.label(*glyph);
                                ui.hyperlink_to(title.as_str(), url).on_hover_text(url.as_str());
                            });
                        }
                    }
                }
            });
        });
    }
}

impl eframe::App for LinkshelfApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        if self.style_dirty {
            style::apply_palette(ctx, &self.palette, self.config.appearance.font_size);
            self.style_dirty = false;
        }

        self.handle_internal_events();
        self.tick_spinner();

        self.handle_search_keyboard(ctx);
        self.draw_top_bar(ctx);
        self.draw_dropdown(ctx);
        self.draw_navigation(ctx);
        self.draw_content(ctx);
        self.handle_click_outside(ctx);

        if self.probe_in_progress {
            ctx.request_repaint_after(Duration::from_millis(80));
        }
    }
}
