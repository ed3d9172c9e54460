//! Deal List Example - Incremental reveal in a real terminal
//!
//! This example demonstrates everything working together:
//! - Static deal source behind the response envelope
//! - Reveal window growing as you scroll toward its end
//! - Deferred preload after each growth step
//! - Live countdown badges
//! - One completion report per load (`r` reloads)
//!
//! Keys: j/k or arrows scroll, PageUp/PageDown page, r reload, q quit.
//!
//! Run with: RUST_LOG=deal_reveal=debug cargo run --example deal_list 2>trace.log

use std::collections::HashMap;
use std::io::{self, stdout, Write};
use std::rc::Rc;
use std::time::Duration;

use crossterm::cursor::{Hide, Show};
use crossterm::event::{self, Event, KeyCode, KeyEventKind};
use crossterm::execute;
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, size, EnterAlternateScreen, LeaveAlternateScreen,
};
use deal_reveal::state::scroll::{max_offset, page_size, scroll_by, LINE_SCROLL};
use deal_reveal::{
    Clock, ClockSource, CompletionReport, Countdown, DealList, ListRenderer, PlatformContext,
    RevealConfig, StaticDealSource,
};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

const RESTAURANT_ID: &str = "1";

const DEALS: &str = r#"[
    { "dealId": "1", "dealImage": "/static/food1.png", "dealTitle": "椒麻鸡双人套餐", "price": 168, "originalPrice": 298, "buttonText": "抢购",
      "badges": [{ "text": "限时", "subText": "0:00:45", "type": "countdown" }] },
    { "dealId": "2", "dealImage": "/static/food2.png", "dealTitle": "招牌冷锅串串", "price": 59.9, "originalPrice": 88, "buttonText": "抢购",
      "badges": [{ "text": "减", "subText": "10" }] },
    { "dealId": "3", "dealImage": "/static/food3.png", "dealTitle": "柠檬手打茶", "price": 12, "originalPrice": 18, "buttonText": "购买" },
    { "dealId": "4", "dealImage": "https://img.example.com/4.png", "dealTitle": "藤椒鱼片", "price": 78, "originalPrice": 128, "buttonText": "抢购" },
    { "dealId": "5", "dealImage": "/static/food5.png", "dealTitle": "四人欢聚餐", "price": 288, "originalPrice": 468, "buttonText": "抢购",
      "badges": [{ "text": "仅剩", "subText": "2:00:00", "type": "countdown" }] },
    { "dealId": "6", "dealImage": "/static/food6.png", "dealTitle": "凉拌三丝", "price": 16, "originalPrice": 22, "buttonText": "购买" },
    { "dealId": "7", "dealImage": "/static/food7.png", "dealTitle": "红糖糍粑", "price": 18, "originalPrice": 26, "buttonText": "购买" },
    { "dealId": "8", "dealImage": "/static/food8.png", "dealTitle": "麻辣兔头 (2只)", "price": 36, "originalPrice": 48, "buttonText": "抢购",
      "badges": [{ "text": "新品" }] },
    { "dealId": "9", "dealImage": "/static/food9.png", "dealTitle": "钵钵鸡", "price": 45, "originalPrice": 60, "buttonText": "购买" },
    { "dealId": "10", "dealImage": "", "dealTitle": "冰粉", "price": 8, "originalPrice": 10, "buttonText": "购买" },
    { "dealId": "11", "dealImage": "/static/food11.png", "dealTitle": "夫妻肺片", "price": 42, "originalPrice": 58, "buttonText": "购买",
      "badges": [{ "text": "限时", "subText": "00:10:00", "type": "countdown" }] },
    { "dealId": "12", "dealImage": "/static/food12.png", "dealTitle": "担担面", "price": 15, "originalPrice": 20, "buttonText": "购买" }
]"#;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(io::stderr),
        )
        .init();

    let source = StaticDealSource::from_json(RESTAURANT_ID, DEALS)?;
    let sink = Rc::new(|report: &CompletionReport| {
        tracing::info!(report = ?report, "completion report");
    });
    let list = DealList::mount(
        RevealConfig::default(),
        Rc::new(ClockSource::detect()),
        sink,
    );

    let (width, height) = size()?;
    let mut renderer = ListRenderer::new(width, height, PlatformContext::container());

    enable_raw_mode()?;
    let mut out = stdout();
    execute!(out, EnterAlternateScreen, Hide)?;

    let result = run(&list, &source, &mut renderer, &mut out);

    execute!(out, Show, LeaveAlternateScreen)?;
    disable_raw_mode()?;
    list.unmount();
    result
}

fn run(
    list: &DealList,
    source: &StaticDealSource,
    renderer: &mut ListRenderer,
    out: &mut impl Write,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut countdowns = load(list, source);

    loop {
        let frame = renderer.render(out, list, |deal| {
            countdowns.get(&deal.deal_id).map(Countdown::display)
        })?;
        if let Some(last) = frame.last_in_view {
            list.on_viewport(last);
        }

        let wait = list
            .next_deadline()
            .map(|deadline| (deadline - list.timers().clock().now()).max(0.0))
            .unwrap_or(250.0);

        if event::poll(Duration::from_millis(wait as u64))? {
            match event::read()? {
                Event::Key(key) if key.kind == KeyEventKind::Press => {
                    let viewport = renderer.viewport_items();
                    let max = max_offset(list.visible_count(), viewport);
                    let delta = match key.code {
                        KeyCode::Char('q') | KeyCode::Esc => return Ok(()),
                        KeyCode::Char('r') => {
                            countdowns = load(list, source);
                            renderer.set_offset(0);
                            0
                        }
                        KeyCode::Down | KeyCode::Char('j') => LINE_SCROLL as isize,
                        KeyCode::Up | KeyCode::Char('k') => -(LINE_SCROLL as isize),
                        KeyCode::PageDown => page_size(viewport) as isize,
                        KeyCode::PageUp => -(page_size(viewport) as isize),
                        _ => 0,
                    };
                    if let Some(offset) = scroll_by(renderer.offset(), delta, max) {
                        renderer.set_offset(offset);
                    }
                }
                Event::Resize(width, height) => renderer.resize(width, height),
                _ => {}
            }
        }

        list.tick();
    }
}

/// Load the deals and start a countdown for every countdown badge.
fn load(list: &DealList, source: &StaticDealSource) -> HashMap<String, Countdown> {
    list.load(source, RESTAURANT_ID);
    list.visible_slice()
        .collection()
        .iter()
        .filter_map(|deal| {
            let badge = deal.primary_badge()?;
            let sub_text = badge.sub_text.as_deref()?;
            badge
                .kind
                .is_countdown()
                .then(|| (deal.deal_id.clone(), list.countdown(sub_text)))
        })
        .collect()
}
