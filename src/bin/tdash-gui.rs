/*!
 * Desktop front end for transit-dash: a profile page and a punctuality dashboard.
 *
 * - Sidebar: view switch, line multi-select, date window, data file
 * - Dashboard: KPI row and four tabs (timeline, ranking, weekly heatmap, amenity map)
 * - Export of the filtered records and the current chart
 *
 * Platform support: Windows, macOS, Linux
 */

use anyhow::Result;
use chrono::NaiveDate;
use eframe::egui;
use std::path::PathBuf;
use transit_dash::dashboard::{DashboardPage, Notice};
use transit_dash::profile::{Portrait, load_portrait};
use transit_dash::viz::util::{format_count, format_decimal};
use transit_dash::viz::{self, ChartInput, ChartKind, ChartOptions, LegendMode};
use transit_dash::{
    AppConfig, DataCache, Dashboard, DateWindow, Page, Selection, Tab, View, dispatch, storage,
};

fn main() -> Result<(), eframe::Error> {
    env_logger::init();

    let config = match std::env::args_os().nth(1) {
        Some(path) => AppConfig::from_file(PathBuf::from(path)).unwrap_or_else(|e| {
            log::error!("{e}; using defaults");
            AppConfig::default()
        }),
        None => AppConfig::default(),
    };

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1200.0, 800.0])
            .with_min_inner_size([800.0, 500.0])
            .with_title("Transit dashboard"),
        ..Default::default()
    };

    eframe::run_native(
        "Transit dashboard",
        options,
        Box::new(|_cc| Ok(Box::new(TdashApp::new(config)))),
    )
}

/// What the current chart texture was rendered from.
#[derive(Debug, Clone, PartialEq)]
struct ChartKey {
    tab: Tab,
    selection: Selection,
    legend: LegendMode,
    loads: usize,
}

struct TdashApp {
    config: AppConfig,
    cache: DataCache,
    dashboard: Option<Dashboard>,
    portrait: Portrait,
    portrait_texture: Option<egui::TextureHandle>,

    // UI state
    view: View,
    tab: Tab,
    selection: Selection,
    from_text: String,
    until_text: String,
    legend: LegendMode,

    chart: Option<(ChartKey, Result<egui::TextureHandle, String>)>,

    status_message: String,
    error_message: String,
}

fn parse_day(s: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d").ok()
}

impl TdashApp {
    fn new(config: AppConfig) -> Self {
        let portrait = load_portrait(config.resolved_portrait_path());
        let calendar = config
            .simulation
            .validate()
            .unwrap_or_else(|_| DateWindow::single(config.simulation.start));
        let mut app = Self {
            legend: config.chart.legend,
            cache: DataCache::new(),
            dashboard: None,
            portrait,
            portrait_texture: None,
            view: View::default(),
            tab: Tab::default(),
            selection: Selection::new(Vec::<String>::new(), calendar),
            from_text: String::new(),
            until_text: String::new(),
            chart: None,
            status_message: String::new(),
            error_message: String::new(),
            config,
        };
        app.reload(true);
        app
    }

    /// Rebuild the dashboard from the caches; `reset` also restores the default selection.
    fn reload(&mut self, reset: bool) {
        match Dashboard::from_cache(&mut self.cache, &self.config) {
            Ok(dashboard) => {
                if reset {
                    self.selection = dashboard.default_selection(&self.config.default_lines);
                    self.from_text = self.selection.window.start().to_string();
                    self.until_text = self.selection.window.end().to_string();
                }
                self.dashboard = Some(dashboard);
                self.error_message.clear();
            }
            Err(e) => {
                self.dashboard = None;
                self.error_message = format!("Invalid simulation settings: {e}");
            }
        }
        self.chart = None;
    }

    fn apply_dates(&mut self) {
        let (Some(from), Some(until)) = (parse_day(&self.from_text), parse_day(&self.until_text))
        else {
            self.error_message = "Dates must be written YYYY-MM-DD".into();
            return;
        };
        match DateWindow::new(from, until) {
            Ok(window) => {
                self.selection.window = window;
                self.error_message.clear();
            }
            Err(e) => self.error_message = e.to_string(),
        }
    }

    fn chart_options(&self) -> ChartOptions {
        ChartOptions {
            width: self.config.chart.width,
            height: self.config.chart.height,
            title: String::new(),
            legend: self.legend,
            target_rate: self.config.target_rate,
            locale: self.config.chart.locale.clone(),
        }
    }

    /// Texture for the current tab, re-rendered only when its inputs changed.
    fn chart_texture(
        &mut self,
        ctx: &egui::Context,
        page: &DashboardPage,
    ) -> Result<egui::TextureHandle, String> {
        let key = ChartKey {
            tab: self.tab,
            selection: self.selection.clone(),
            legend: self.legend,
            loads: self.cache.amenity_loads() + self.cache.simulation_computations(),
        };
        if let Some((k, tex)) = &self.chart
            && *k == key
        {
            return tex.clone();
        }
        let opts = self.chart_options();
        let kind = ChartKind::from(self.tab);
        let rendered = viz::render_chart_rgb(kind, &ChartInput::from_page(page), &opts)
            .map(|rgb| {
                let size = [opts.width as usize, opts.height as usize];
                let image = egui::ColorImage::from_rgb(size, &rgb);
                ctx.load_texture("chart", image, egui::TextureOptions::LINEAR)
            })
            .map_err(|e| e.to_string());
        self.chart = Some((key, rendered.clone()));
        rendered
    }

    fn export(&mut self, page: &DashboardPage) {
        let start_dir = dirs::home_dir().unwrap_or_else(|| PathBuf::from("."));
        let Some(dir) = rfd::FileDialog::new().set_directory(start_dir).pick_folder() else {
            return;
        };
        let csv_path = dir.join("punctuality.csv");
        let chart_path = dir.join(format!("{:?}.png", self.tab).to_lowercase());
        let result = storage::save_regularity_csv(&page.data.regularity, &csv_path).and_then(|_| {
            viz::render_chart(
                ChartKind::from(self.tab),
                &ChartInput::from_page(page),
                &chart_path,
                &self.chart_options(),
            )
        });
        match result {
            Ok(()) => {
                self.status_message = format!(
                    "Files created:\n{}\n{}",
                    csv_path.display(),
                    chart_path.display()
                );
                self.error_message.clear();
            }
            Err(e) => self.error_message = format!("Export failed: {e}"),
        }
    }

    fn sidebar(&mut self, ui: &mut egui::Ui) {
        ui.heading("Navigation");
        ui.radio_value(&mut self.view, View::Profile, "Profile");
        ui.radio_value(&mut self.view, View::Dashboard, "Dashboard");

        if self.view != View::Dashboard {
            return;
        }
        let Some(dashboard) = &self.dashboard else {
            return;
        };

        ui.separator();
        ui.label("Lines");
        let options = dashboard.line_options();
        egui::ScrollArea::vertical()
            .max_height(260.0)
            .show(ui, |ui| {
                for line in &options {
                    let mut on = self.selection.includes_line(line);
                    if ui.checkbox(&mut on, format!("Line {line}")).changed() {
                        self.selection.toggle(line);
                    }
                }
            });

        ui.separator();
        ui.label("Period");
        ui.horizontal(|ui| {
            ui.label("From");
            ui.text_edit_singleline(&mut self.from_text);
        });
        ui.horizontal(|ui| {
            ui.label("Until");
            ui.text_edit_singleline(&mut self.until_text);
        });
        if ui.button("Apply dates").clicked() {
            self.apply_dates();
        }

        ui.separator();
        ui.label("Timeline legend");
        egui::ComboBox::from_id_salt("legend")
            .selected_text(format!("{:?}", self.legend))
            .show_ui(ui, |ui| {
                ui.selectable_value(&mut self.legend, LegendMode::Bottom, "Bottom");
                ui.selectable_value(&mut self.legend, LegendMode::Right, "Right");
                ui.selectable_value(&mut self.legend, LegendMode::Top, "Top");
                ui.selectable_value(&mut self.legend, LegendMode::Inside, "Inside");
            });

        ui.separator();
        ui.label("Amenity table");
        ui.label(self.config.data_path.display().to_string());
        ui.horizontal(|ui| {
            if ui.button("Browse").clicked()
                && let Some(path) = rfd::FileDialog::new().add_filter("CSV", &["csv"]).pick_file()
            {
                self.config.data_path = path;
                self.reload(false);
            }
            if ui.button("Reload").clicked() {
                self.reload(false);
            }
        });
    }

    fn profile_view(&mut self, ui: &mut egui::Ui, ctx: &egui::Context) {
        let page = dispatch(
            View::Profile,
            self.dashboard.as_ref(),
            &self.selection,
            &self.config.profile,
            &self.portrait,
        );
        let Page::Profile(page) = page else {
            return;
        };

        ui.horizontal(|ui| {
            if let Portrait::Loaded(img) = &self.portrait {
                let tex = self.portrait_texture.get_or_insert_with(|| {
                    let image = egui::ColorImage::from_rgba_unmultiplied(
                        [img.width as usize, img.height as usize],
                        &img.rgba,
                    );
                    ctx.load_texture("portrait", image, egui::TextureOptions::LINEAR)
                });
                ui.add(egui::Image::new(&*tex).max_width(180.0));
            }
            ui.vertical(|ui| {
                ui.heading(&page.profile.name);
                ui.label(egui::RichText::new(&page.profile.headline).italics());
            });
        });
        notice_label(ui, page.notice.as_ref());

        ui.add_space(10.0);
        for paragraph in &page.profile.summary {
            ui.label(paragraph);
            ui.add_space(4.0);
        }
        if !page.profile.skills.is_empty() {
            ui.add_space(6.0);
            ui.label(egui::RichText::new("Skills").strong());
            ui.label(page.profile.skills.join(" · "));
        }
    }

    fn dashboard_view(&mut self, ui: &mut egui::Ui, ctx: &egui::Context) {
        let page = match dispatch(
            View::Dashboard,
            self.dashboard.as_ref(),
            &self.selection,
            &self.config.profile,
            &self.portrait,
        ) {
            Page::Dashboard(page) => page,
            Page::Prompt(prompt) | Page::Unavailable(prompt) => {
                ui.label(prompt);
                return;
            }
            Page::Profile(_) => return,
        };

        ui.heading("Transit punctuality");
        for n in &page.notices {
            notice_label(ui, Some(n));
        }

        let locale = self.config.chart.locale.clone();
        let percent = |v: Option<f64>| {
            v.map_or("–".into(), |v| format!("{} %", format_decimal(v, &locale)))
        };
        let k = &page.kpis;
        ui.horizontal(|ui| {
            kpi(ui, "Mean punctuality", percent(k.mean_rate));
            kpi(ui, "Worst day", percent(k.worst_day));
            kpi(ui, "Amenities", k.amenity_count.to_string());
            kpi(ui, "Lines", k.line_count.to_string());
            kpi(ui, "Riders", format_count(k.total_ridership, &locale));
        });

        ui.separator();
        ui.horizontal(|ui| {
            for tab in Tab::ALL {
                ui.selectable_value(&mut self.tab, tab, tab.title());
            }
            if ui.button("Export…").clicked() {
                self.export(&page);
            }
        });

        if self.tab == Tab::Map {
            notice_label(ui, page.map.notice().as_ref());
        }
        match self.chart_texture(ctx, &page) {
            Ok(tex) => {
                ui.add(egui::Image::new(&tex).max_width(ui.available_width()));
            }
            // the map notice already explains an empty map
            Err(_) if self.tab == Tab::Map && page.map.notice().is_some() => {}
            Err(e) => {
                ui.colored_label(egui::Color32::GRAY, e);
            }
        }

        if self.tab == Tab::Map && !page.map.rows().is_empty() {
            ui.add_space(8.0);
            egui::Grid::new("amenity_rows").striped(true).show(ui, |ui| {
                for h in ["Line", "Station", "Address", "Municipality", "Zone"] {
                    ui.label(egui::RichText::new(h).strong());
                }
                ui.end_row();
                for a in page.map.rows() {
                    ui.label(&a.line);
                    ui.label(&a.station);
                    ui.label(&a.address);
                    ui.label(&a.municipality);
                    ui.label(a.zone.as_deref().unwrap_or(""));
                    ui.end_row();
                }
            });
        }
    }
}

fn kpi(ui: &mut egui::Ui, label: &str, value: String) {
    ui.group(|ui| {
        ui.vertical(|ui| {
            ui.label(egui::RichText::new(label).small());
            ui.label(egui::RichText::new(value).heading());
        });
    });
}

fn notice_label(ui: &mut egui::Ui, notice: Option<&Notice>) {
    match notice {
        Some(Notice::Info(m)) => {
            ui.colored_label(egui::Color32::LIGHT_BLUE, m);
        }
        Some(Notice::Warning(m)) => {
            ui.colored_label(egui::Color32::from_rgb(230, 160, 0), m);
        }
        Some(Notice::Error(m)) => {
            ui.colored_label(egui::Color32::RED, m);
        }
        None => {}
    }
}

impl eframe::App for TdashApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        egui::SidePanel::left("sidebar")
            .resizable(false)
            .min_width(200.0)
            .show(ctx, |ui| self.sidebar(ui));

        egui::CentralPanel::default().show(ctx, |ui| {
            egui::ScrollArea::vertical().show(ui, |ui| {
                match self.view {
                    View::Profile => self.profile_view(ui, ctx),
                    View::Dashboard => self.dashboard_view(ui, ctx),
                }

                ui.add_space(10.0);
                if !self.status_message.is_empty() {
                    ui.colored_label(egui::Color32::DARK_GREEN, &self.status_message);
                }
                if !self.error_message.is_empty() {
                    ui.colored_label(egui::Color32::RED, &self.error_message);
                }
            });
        });
    }
}
