//! Terminal Example - A portfolio page driven by the real components
//!
//! This example hosts all three components in a terminal:
//! - Page sections reveal as you scroll them into view
//! - The header clock ticks every second and the skill ticker rotates
//! - Left/Right switch the project category tab
//!
//! Keys: Up/Down (or k/j) scroll, Left/Right switch tabs, 1-9 highlight a
//! skill, q quits.
//!
//! Run with: cargo run --example terminal 2>folio.log
//! Set RUST_LOG=spark_folio=debug to watch the subscription lifecycle.

use std::error::Error;
use std::io::{self, Write};
use std::path::Path;
use std::rc::Rc;
use std::time::Duration;

use crossterm::cursor::{Hide, MoveTo, Show};
use crossterm::event::{self, Event, KeyCode, KeyEventKind};
use crossterm::style::{Attribute, Print, SetAttribute};
use crossterm::terminal::{self, Clear, ClearType, EnterAlternateScreen, LeaveAlternateScreen};
use crossterm::{execute, queue};
use tracing_subscriber::EnvFilter;

use spark_folio::{
    CatalogEntry, CatalogFilter, FolioConfig, GeometryObserver, LiveClockTicker, Rect,
    RealtimeScheduler, RegionId, RevealController, RevealDelay, Scheduler, SystemClock,
    TickerItem, ViewportObserver,
};

/// Page pixels per terminal row.
const ROW_PX: f32 = 20.0;
const HEADER_ROWS: u16 = 5;
const SECTION_ROWS: u16 = 8;

const SECTIONS: [(&str, &str); 6] = [
    ("Landing", "Cloud native infra. Building seamless cloud infrastructure and DevOps pipelines."),
    ("About", "DevOps engineer: pipelines, platforms and monitoring that keep teams shipping."),
    ("Cloud & IaC", "Multi-cloud across AWS and Azure with Terraform-driven automation."),
    ("Containers", "Production Kubernetes on EKS with Helm-managed deployments."),
    ("Resume", "4+ years designing, automating and scaling secure infrastructure."),
    ("Contact", "Say hello."),
];

struct Page {
    observer: Rc<GeometryObserver>,
    scheduler: Rc<RealtimeScheduler>,
    reveals: Vec<RevealController>,
    ticker: LiveClockTicker,
    filter: CatalogFilter,
    rows: u16,
}

fn skills() -> Vec<TickerItem> {
    ["AWS", "Terraform", "Kubernetes", "Docker", "Jenkins"]
        .into_iter()
        .map(|name| TickerItem::new(name, "skill"))
        .collect()
}

fn catalog() -> Vec<CatalogEntry> {
    vec![
        CatalogEntry::new("react", "My First React Project").with_tags(["react"]),
        CatalogEntry::new("javascript", "JavaScript Algorithms").with_tags(["javascript"]),
        CatalogEntry::new("react", "To-Do List").with_tags(["react"]),
        CatalogEntry::new("mongodb", "MEN Stack Team Project").with_tags(["mongodb", "express", "node"]),
        CatalogEntry::new("javascript", "Passport Auth").with_tags(["passport", "bcrypt"]),
        CatalogEntry::new("mern", "Coming Soon"),
    ]
}

fn body_viewport(cols: u16, rows: u16, scroll_y: f32) -> Rect {
    Rect::new(
        0.0,
        scroll_y,
        cols as f32 * ROW_PX,
        rows.saturating_sub(HEADER_ROWS) as f32 * ROW_PX,
    )
}

fn page_height() -> f32 {
    SECTIONS.len() as f32 * SECTION_ROWS as f32 * ROW_PX
}

fn mount(config: &FolioConfig) -> io::Result<Page> {
    let (cols, rows) = terminal::size()?;
    let observer = Rc::new(GeometryObserver::new(body_viewport(cols, rows, 0.0)));
    let scheduler = Rc::new(RealtimeScheduler::new());

    let reveals = (0..SECTIONS.len())
        .map(|i| {
            let region = RegionId(i as u32);
            let top = i as f32 * SECTION_ROWS as f32 * ROW_PX;
            observer.set_region(region, Rect::new(0.0, top, cols as f32 * ROW_PX, SECTION_ROWS as f32 * ROW_PX));
            let reveal = RevealController::attach(Some(observer.clone()), region, &config.reveal);
            match RevealDelay::new((i % 4 + 1) as u8) {
                Ok(delay) => reveal.with_delay(delay),
                Err(_) => reveal,
            }
        })
        .collect();

    let ticker = LiveClockTicker::mount(skills(), Rc::new(SystemClock), scheduler.clone(), &config.ticker);
    let filter = CatalogFilter::new(catalog());
    observer.refresh();

    Ok(Page {
        observer,
        scheduler,
        reveals,
        ticker,
        filter,
        rows,
    })
}

fn scroll(page: &Page, dy: f32) {
    let viewport = page.observer.viewport();
    let max = (page_height() - viewport.height).max(0.0);
    page.observer.scroll_to((viewport.y + dy).clamp(0.0, max));
}

fn cycle_tab(filter: &CatalogFilter, forward: bool) {
    let count = filter.tabs().len();
    let current = filter.active_tab().unwrap_or(0);
    let next = if forward { (current + 1) % count } else { (current + count - 1) % count };
    filter.select_tab(next);
}

fn print_chip(out: &mut impl Write, label: &str, active: bool) -> io::Result<()> {
    if active {
        queue!(
            out,
            SetAttribute(Attribute::Reverse),
            Print(format!(" {label} ")),
            SetAttribute(Attribute::Reset)
        )
    } else {
        queue!(out, Print(format!(" {label} ")))
    }
}

fn draw(out: &mut impl Write, page: &Page) -> io::Result<()> {
    queue!(out, Clear(ClearType::All), MoveTo(0, 0))?;

    // Clock
    let clock = page.ticker.view();
    queue!(
        out,
        SetAttribute(Attribute::Bold),
        Print(&clock.time),
        SetAttribute(Attribute::Reset),
        Print(format!("  {}, {}", clock.day, clock.month_day))
    )?;

    // Ticker
    queue!(out, MoveTo(0, 1))?;
    for (i, item) in page.ticker.items().iter().enumerate() {
        print_chip(out, &item.name, i == clock.active_index)?;
    }

    // Category tabs + visible projects
    queue!(out, MoveTo(0, 2))?;
    let active_tab = page.filter.active_tab();
    for (i, tab) in page.filter.tabs().iter().enumerate() {
        print_chip(out, tab.as_str(), Some(i) == active_tab)?;
    }
    let titles: Vec<&str> = page
        .filter
        .visible_entries()
        .into_iter()
        .map(|entry| entry.title.as_str())
        .collect();
    queue!(out, MoveTo(0, 3), Print(titles.join(" · ")))?;

    // Page body
    let first_row = (page.observer.viewport().y / ROW_PX) as u16;
    for screen_row in HEADER_ROWS..page.rows {
        let page_row = first_row + (screen_row - HEADER_ROWS);
        let section = (page_row / SECTION_ROWS) as usize;
        let Some(reveal) = page.reveals.get(section) else {
            break;
        };
        let (title, body) = SECTIONS[section];

        queue!(out, MoveTo(0, screen_row))?;
        if !reveal.is_visible() {
            queue!(out, SetAttribute(Attribute::Dim), Print("·"), SetAttribute(Attribute::Reset))?;
            continue;
        }
        match page_row % SECTION_ROWS {
            0 => queue!(
                out,
                SetAttribute(Attribute::Bold),
                Print(format!("── {title}")),
                SetAttribute(Attribute::Reset),
                Print(format!("  [{}]", reveal.class_name(None)))
            )?,
            2 => queue!(out, Print(body))?,
            _ => {}
        }
    }

    out.flush()
}

fn run(out: &mut impl Write, config: &FolioConfig) -> io::Result<()> {
    let mut page = mount(config)?;
    let mut dirty = true;

    loop {
        if dirty {
            draw(out, &page)?;
            dirty = false;
        }

        let wait = page
            .scheduler
            .time_until_next()
            .unwrap_or(Duration::from_millis(250));

        if event::poll(wait)? {
            match event::read()? {
                Event::Key(key) if key.kind == KeyEventKind::Press => match key.code {
                    KeyCode::Char('q') | KeyCode::Esc => break,
                    KeyCode::Down | KeyCode::Char('j') => scroll(&page, ROW_PX),
                    KeyCode::Up | KeyCode::Char('k') => scroll(&page, -ROW_PX),
                    KeyCode::PageDown => scroll(&page, page.observer.viewport().height),
                    KeyCode::PageUp => scroll(&page, -page.observer.viewport().height),
                    KeyCode::Right => cycle_tab(&page.filter, true),
                    KeyCode::Left => cycle_tab(&page.filter, false),
                    KeyCode::Char(c @ '1'..='9') => page.ticker.select(c as usize - '1' as usize),
                    _ => {}
                },
                Event::Resize(cols, rows) => {
                    page.rows = rows;
                    let viewport = body_viewport(cols, rows, page.observer.viewport().y);
                    page.observer.resize(viewport.width, viewport.height);
                }
                _ => {}
            }
            dirty = true;
        }

        page.scheduler.pump();
        if !page.ticker.take_changes().is_empty() {
            dirty = true;
        }
    }

    let Page {
        observer,
        scheduler,
        reveals,
        ticker,
        ..
    } = page;
    ticker.unmount();
    for reveal in &reveals {
        reveal.detach();
    }
    tracing::info!(
        observed = observer.active_registrations(),
        timers = scheduler.active_tasks(),
        "page unmounted"
    );
    Ok(())
}

fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();

    let config = FolioConfig::load_from(Path::new("spark-folio.json"))?;

    let mut stdout = io::stdout();
    terminal::enable_raw_mode()?;
    execute!(stdout, EnterAlternateScreen, Hide)?;

    let result = run(&mut stdout, &config);

    execute!(stdout, Show, LeaveAlternateScreen)?;
    terminal::disable_raw_mode()?;
    Ok(result?)
}
