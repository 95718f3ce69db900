//! Drawing. Reads `App` state only; nothing here changes it.

use ratatui::{
    prelude::*,
    widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph, Tabs, Wrap},
};
use shared::{AccountMode, PaidPlan, Theme};

use super::app::{AdminTab, App, FieldKey, Form, GenField, ResetStep, View};
use crate::error::Level;
use crate::generation::Remaining;
use crate::i18n::{Section, Strings};
use crate::search::Category;
use crate::share;

pub fn draw(frame: &mut Frame, app: &App) {
    let area = frame.area();

    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(0),
            Constraint::Length(1),
            Constraint::Length(1),
        ])
        .split(area);

    draw_nav(frame, app, layout[0]);
    draw_view(frame, app, layout[1]);
    draw_notification(frame, app, layout[2]);
    draw_status_bar(frame, app, layout[3]);

    if app.search.is_some() {
        draw_search(frame, app, area);
    }
}

fn draw_nav(frame: &mut Frame, app: &App, area: Rect) {
    let strings = app.strings();
    let sections = app.nav_sections();
    let titles: Vec<_> = sections
        .iter()
        .map(|s| match s {
            Section::Pricing if app.upgrade_due => format!("{} *", strings.section(*s)),
            _ => strings.section(*s).to_string(),
        })
        .collect();
    let selected = app
        .view()
        .section()
        .and_then(|current| sections.iter().position(|s| *s == current));

    let account = match app.session.user() {
        Some(user) if app.session.is_verified() => format!(" {} ", user.display_name()),
        Some(user) => format!(" {} (…) ", user.display_name()),
        None => format!(" {} ", strings.profile.signed_out),
    };

    // Off-nav screens (login, register, reset) highlight nothing
    let highlight = match selected {
        Some(_) => Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
        None => Style::default(),
    };
    let tabs = Tabs::new(titles)
        .block(
            Block::default()
                .title(" PhotoSet AI ")
                .title_bottom(Line::from(account).right_aligned())
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Cyan)),
        )
        .highlight_style(highlight)
        .select(selected.unwrap_or(0));
    frame.render_widget(tabs, area);
}

fn draw_view(frame: &mut Frame, app: &App, area: Rect) {
    let strings = app.strings();
    let title = match app.view() {
        View::Login => strings.forms.sign_in,
        View::Register => strings.forms.register,
        View::ResetPassword => strings.forms.reset_password,
        view => view.section().map(|s| strings.section(s)).unwrap_or_default(),
    };
    let block = Block::default()
        .title(format!(" {} ", title))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Gray));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    match app.view() {
        View::Home => draw_home(frame, strings, inner),
        View::Generator => draw_generator(frame, app, inner),
        View::Gallery => draw_gallery(frame, app, inner),
        View::Examples => draw_examples(frame, app, inner),
        View::Prompts => draw_prompts(frame, app, inner),
        View::Faq => draw_faq(frame, strings, inner),
        View::Pricing => draw_pricing(frame, app, inner),
        View::Support => draw_support(frame, strings, inner),
        View::Profile => draw_profile(frame, app, inner),
        View::Admin => draw_admin(frame, app, inner),
        View::Login => draw_form(frame, app, &app.login, inner),
        View::Register => draw_form(frame, app, &app.register, inner),
        View::ResetPassword => draw_form(frame, app, &app.reset, inner),
    }
}

fn heading(text: &str) -> Line<'static> {
    Line::from(Span::styled(
        text.to_string(),
        Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
    ))
}

fn dim(text: impl Into<String>) -> Span<'static> {
    Span::styled(text.into(), Style::default().fg(Color::DarkGray))
}

fn draw_home(frame: &mut Frame, strings: &Strings, area: Rect) {
    let mut lines = vec![
        heading(strings.hero.title),
        Line::from(strings.hero.subtitle),
        Line::default(),
    ];
    for feature in &strings.features {
        lines.push(Line::from(Span::styled(
            feature.title,
            Style::default().add_modifier(Modifier::BOLD),
        )));
        lines.push(Line::from(dim(feature.description)));
    }
    lines.push(Line::default());
    lines.push(Line::from(Span::styled(
        format!("[ {} ]", strings.hero.cta),
        Style::default().fg(Color::Green),
    )));
    frame.render_widget(Paragraph::new(lines).wrap(Wrap { trim: false }), area);
}

fn field_style(focused: bool) -> Style {
    if focused {
        Style::default().fg(Color::Green)
    } else {
        Style::default().fg(Color::DarkGray)
    }
}

fn draw_generator(frame: &mut Frame, app: &App, area: Rect) {
    let strings = app.strings();
    let gen = &app.generator;

    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Min(0),
        ])
        .split(area);

    let prompt_block = Block::default()
        .title(format!(" {} ", strings.generator.prompt))
        .borders(Borders::ALL)
        .border_style(field_style(gen.focus == GenField::Prompt));
    let cursor = if gen.focus == GenField::Prompt { "_" } else { "" };
    frame.render_widget(
        Paragraph::new(format!("{}{}", gen.prompt, cursor)).block(prompt_block),
        layout[0],
    );

    let theme = gen.theme.map(|t| strings.theme(t)).unwrap_or("-");
    let rows = [
        (GenField::Theme, strings.generator.choose_theme, format!("< {} >", theme)),
        (GenField::Size, strings.generator.size, format!("< {} >", gen.size)),
        (GenField::Model, strings.generator.model, gen.model.clone()),
    ];
    for (i, (field, label, value)) in rows.into_iter().enumerate() {
        let line = Line::from(vec![
            Span::styled(format!(" {}: ", label), field_style(gen.focus == field)),
            Span::raw(value),
        ]);
        frame.render_widget(Paragraph::new(line), layout[1 + i]);
    }

    let button = if app.is_generating() {
        Span::styled(
            format!(" [ {} ] ", strings.generator.generating),
            Style::default().fg(Color::DarkGray),
        )
    } else {
        Span::styled(
            format!(" [ {} ] ", strings.generator.generate_btn),
            Style::default().fg(Color::Black).bg(Color::Green),
        )
    };
    frame.render_widget(Paragraph::new(Line::from(button)), layout[4]);

    let Some(last) = &gen.last else {
        return;
    };
    let mut lines = vec![
        Line::default(),
        Line::from(Span::styled(
            last.image.image_url.clone(),
            Style::default().fg(Color::Cyan).add_modifier(Modifier::UNDERLINED),
        )),
        Line::from(dim(last.image.prompt.clone())),
    ];
    if last.fallback_prompt {
        lines.push(Line::from(dim(strings.generator.fallback_prompt_note)));
    }
    match last.remaining {
        Remaining::FreeGenerations(n) => {
            lines.push(Line::from(format!("{}: {}", strings.generator.free_left, n)))
        }
        Remaining::Credits(n) => lines.push(Line::from(format!("{}: {}", strings.generator.credits_left, n))),
        Remaining::Unreported => {}
    }
    if !last.saved {
        lines.push(Line::from(Span::styled(
            strings.gallery.not_saved,
            Style::default().fg(Color::Red),
        )));
    }
    frame.render_widget(Paragraph::new(lines).wrap(Wrap { trim: false }), layout[5]);
}

fn draw_gallery(frame: &mut Frame, app: &App, area: Rect) {
    let strings = app.strings();
    if !app.session.is_signed_in() {
        frame.render_widget(Paragraph::new(strings.profile.signed_out), area);
        return;
    }
    if app.gallery.loading {
        frame.render_widget(Paragraph::new(strings.gallery.loading), area);
        return;
    }
    if app.gallery.gallery.is_empty() {
        frame.render_widget(Paragraph::new(strings.gallery.empty), area);
        return;
    }
    let items = app.gallery_items();

    let layout = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(55), Constraint::Percentage(45)])
        .split(area);

    let rows: Vec<ListItem> = items
        .iter()
        .map(|item| {
            let star = if item.image.is_favorite { "★ " } else { "  " };
            let mut spans = vec![Span::raw(star), Span::raw(item.image.prompt.clone())];
            if !item.saved {
                spans.push(Span::styled(
                    format!("  ({})", strings.gallery.not_saved),
                    Style::default().fg(Color::Red),
                ));
            }
            ListItem::new(Line::from(spans))
        })
        .collect();
    let mut state = ListState::default().with_selected(Some(app.gallery.selected));
    let list = List::new(rows).highlight_style(Style::default().bg(Color::DarkGray));
    frame.render_stateful_widget(list, layout[0], &mut state);

    let Some(item) = app.gallery.selected_item() else {
        return;
    };
    let image = &item.image;
    let mut lines = vec![
        Line::from(Span::styled(image.image_url.clone(), Style::default().fg(Color::Cyan))),
        Line::from(format!("{} · {}", image.model, image.theme.as_deref().unwrap_or("-"))),
        Line::from(dim(image.created_at.clone().unwrap_or_default())),
    ];
    if app.gallery.show_share {
        lines.push(Line::default());
        for link in share::share_links(&app.share_base_url, &image.image_url, &image.prompt, app.lang) {
            lines.push(Line::from(vec![
                Span::styled(format!("{:<10}", link.platform), Style::default().fg(Color::Yellow)),
                dim(link.url),
            ]));
        }
    }
    frame.render_widget(Paragraph::new(lines).wrap(Wrap { trim: true }), layout[1]);
}

fn selectable<'a>(labels: impl IntoIterator<Item = Line<'a>>) -> List<'a> {
    List::new(labels.into_iter().map(ListItem::new).collect::<Vec<_>>())
        .highlight_style(Style::default().bg(Color::DarkGray))
        .highlight_symbol("> ")
}

fn draw_examples(frame: &mut Frame, app: &App, area: Rect) {
    let strings = app.strings();
    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(2), Constraint::Min(0)])
        .split(area);
    frame.render_widget(
        Paragraph::new(vec![heading(strings.examples_title), Line::from(dim(strings.examples_description))]),
        layout[0],
    );

    let rows = Theme::ALL.iter().map(|theme| {
        Line::from(vec![
            Span::raw(format!("{:<16}", strings.theme(*theme))),
            dim(crate::generation::fallback_prompt(*theme)),
        ])
    });
    let mut state = ListState::default().with_selected(Some(app.selected));
    frame.render_stateful_widget(selectable(rows), layout[1], &mut state);
}

fn draw_prompts(frame: &mut Frame, app: &App, area: Rect) {
    let strings = app.strings();
    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(2), Constraint::Min(0), Constraint::Length(1)])
        .split(area);
    frame.render_widget(
        Paragraph::new(vec![heading(strings.prompts.title), Line::from(dim(strings.prompts.subtitle))]),
        layout[0],
    );

    // Category titles are shown inline so list indices match prompt_ideas()
    let rows = strings.prompts.categories.iter().flat_map(|category| {
        category.prompts.iter().map(move |prompt| {
            Line::from(vec![
                Span::styled(format!("{:<14}", category.title), Style::default().fg(Color::Cyan)),
                Span::raw(*prompt),
            ])
        })
    });
    let mut state = ListState::default().with_selected(Some(app.selected));
    frame.render_stateful_widget(selectable(rows), layout[1], &mut state);
    frame.render_widget(Paragraph::new(dim(strings.prompts.tip)), layout[2]);
}

fn draw_faq(frame: &mut Frame, strings: &Strings, area: Rect) {
    let mut lines = vec![heading(strings.faq_title), Line::default()];
    for item in strings.faq {
        lines.push(Line::from(Span::styled(item.q, Style::default().add_modifier(Modifier::BOLD))));
        lines.push(Line::from(item.a));
        lines.push(Line::default());
    }
    frame.render_widget(Paragraph::new(lines).wrap(Wrap { trim: false }), area);
}

fn draw_pricing(frame: &mut Frame, app: &App, area: Rect) {
    let strings = app.strings();
    let mut lines = vec![heading(strings.pricing.title), Line::default()];
    for (i, plan) in PaidPlan::ALL.iter().enumerate() {
        lines.push(Line::from(vec![
            Span::styled(format!("{}. ", i + 1), Style::default().fg(Color::Yellow)),
            Span::styled(
                format!("{:<10}", strings.plan(*plan)),
                Style::default().add_modifier(Modifier::BOLD),
            ),
            Span::raw(format!("${:<7}", plan.price())),
            dim(format!("{} {}", plan.credits(), strings.pricing.credits)),
        ]));
    }
    lines.push(Line::default());
    lines.push(Line::from(dim(strings.pricing.buy_hint)));
    lines.push(Line::from(dim(strings.pricing.promo_hint)));

    if let Some(code) = &app.pricing.promo {
        lines.push(Line::default());
        lines.push(Line::from(vec![
            Span::styled(format!("{}: ", strings.forms.promo_code), field_style(true)),
            Span::raw(format!("{}_", code)),
        ]));
    }
    if let Some(order) = &app.pricing.last_order {
        lines.push(Line::default());
        lines.push(Line::from(format!("{}: {}", strings.notices.order_created, order.order_id)));
        if let Some(link) = &order.approve_link {
            lines.push(Line::from(Span::styled(link.clone(), Style::default().fg(Color::Cyan))));
        }
    }
    if app.busy {
        lines.push(Line::from(dim(strings.forms.working)));
    }
    frame.render_widget(Paragraph::new(lines).wrap(Wrap { trim: false }), area);
}

fn draw_support(frame: &mut Frame, strings: &Strings, area: Rect) {
    let lines = vec![
        heading(strings.support.title),
        Line::default(),
        Line::from(strings.support.body),
        Line::default(),
        Line::from(Span::styled(strings.support.contact, Style::default().fg(Color::Cyan))),
    ];
    frame.render_widget(Paragraph::new(lines).wrap(Wrap { trim: false }), area);
}

fn draw_profile(frame: &mut Frame, app: &App, area: Rect) {
    let strings = app.strings();
    let Some(user) = app.session.user() else {
        frame.render_widget(Paragraph::new(strings.profile.signed_out), area);
        return;
    };

    let mut lines = vec![
        heading(user.display_name()),
        Line::from(dim(user.email.clone())),
        Line::default(),
        Line::from(format!("{}: {}", strings.profile.plan, user.plan)),
    ];
    match user.account_mode() {
        AccountMode::FreeTier => lines.push(Line::from(format!(
            "{}: {} / {}",
            strings.profile.free_left,
            user.free_generations_remaining(),
            user.free_generations_limit
        ))),
        AccountMode::Credits => lines.push(Line::from(format!("{}: {}", strings.profile.credits_left, user.credits))),
    }
    let generated = app.gallery_items().len();
    if generated > 0 {
        lines.push(Line::from(format!("{}: {}", strings.profile.generated, generated)));
    }
    frame.render_widget(Paragraph::new(lines), area);
}

fn draw_admin(frame: &mut Frame, app: &App, area: Rect) {
    let strings = app.strings();
    let copy = &strings.admin;
    let admin = &app.admin;

    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(1), Constraint::Min(0)])
        .split(area);

    let titles: Vec<_> = AdminTab::ALL
        .iter()
        .map(|tab| match tab {
            AdminTab::Overview => copy.overview,
            AdminTab::Users => copy.users,
            AdminTab::Images => copy.images,
            AdminTab::Promos => copy.promos,
        })
        .collect();
    let selected = AdminTab::ALL.iter().position(|t| *t == admin.tab).unwrap_or(0);
    frame.render_widget(
        Tabs::new(titles)
            .highlight_style(Style::default().fg(Color::Yellow))
            .select(selected),
        layout[0],
    );

    if admin.loading && admin.stats.is_none() {
        frame.render_widget(Paragraph::new(copy.loading), layout[1]);
        return;
    }

    let mut state = ListState::default().with_selected(Some(admin.selected));
    match admin.tab {
        AdminTab::Overview => {
            let stats = admin.stats.clone().unwrap_or_default();
            let lines = vec![
                Line::from(format!("{}: {}", copy.total_users, stats.total_users)),
                Line::from(format!("{}: {}", copy.total_images, stats.total_images)),
                Line::from(format!("{}: {}", copy.credits_used, stats.total_credits_used)),
                Line::from(format!("{}: {}", copy.active_users, stats.active_users_this_week)),
            ];
            frame.render_widget(Paragraph::new(lines), layout[1]);
        }
        AdminTab::Users => {
            let rows = admin.users.iter().map(|u| {
                Line::from(vec![
                    Span::raw(format!("{:<24}", u.email)),
                    Span::raw(format!("{:<10}", u.plan)),
                    dim(format!("{} / {}", u.credits, u.free_generations_used)),
                ])
            });
            frame.render_stateful_widget(selectable(rows), layout[1], &mut state);
        }
        AdminTab::Images => {
            let rows = admin.images.iter().map(|i| {
                let owner = i.owner.username.clone().unwrap_or_else(|| i.owner.id.to_string());
                Line::from(vec![Span::raw(format!("{:<16}", owner)), dim(i.prompt.clone())])
            });
            frame.render_stateful_widget(selectable(rows), layout[1], &mut state);
        }
        AdminTab::Promos => {
            let rows = admin.promos.iter().map(|p| {
                let uses = match p.max_uses {
                    Some(max) => format!("{}/{}", p.used_count, max),
                    None => p.used_count.to_string(),
                };
                let status = if p.is_active { copy.active } else { copy.inactive };
                Line::from(vec![
                    Span::styled(format!("{:<14}", p.code), Style::default().fg(Color::Yellow)),
                    Span::raw(format!("+{:<5}", p.generations_granted)),
                    Span::raw(format!("{:<9}", uses)),
                    dim(status),
                ])
            });
            frame.render_stateful_widget(selectable(rows), layout[1], &mut state);

            if let Some(form) = &admin.promo_form {
                let popup = centered(area, 50, 6);
                frame.render_widget(Clear, popup);
                let block = Block::default()
                    .title(format!(" {} ", copy.promos))
                    .borders(Borders::ALL)
                    .border_style(Style::default().fg(Color::Green));
                let inner = block.inner(popup);
                frame.render_widget(block, popup);
                frame.render_widget(Paragraph::new(form_lines(strings, form)), inner);
            }
        }
    }
}

fn field_label(strings: &Strings, key: FieldKey) -> &'static str {
    let forms = &strings.forms;
    match key {
        FieldKey::Email => forms.email,
        FieldKey::Password => forms.password,
        FieldKey::ConfirmPassword => forms.confirm_password,
        FieldKey::Username => forms.username,
        FieldKey::FullName => forms.full_name,
        FieldKey::AcceptTerms => forms.accept_terms,
        FieldKey::ResetToken => forms.reset_token,
        FieldKey::Generations => forms.generations,
        FieldKey::MaxUses => forms.max_uses,
    }
}

fn form_lines(strings: &Strings, form: &Form) -> Vec<Line<'static>> {
    form.fields
        .iter()
        .enumerate()
        .map(|(i, field)| {
            let focused = i == form.focus;
            let label = Span::styled(format!("{}: ", field_label(strings, field.key)), field_style(focused));
            let value = match field.checked {
                Some(true) => "[x]".to_string(),
                Some(false) => "[ ]".to_string(),
                None if field.secret => "•".repeat(field.value.chars().count()),
                None => field.value.clone(),
            };
            let cursor = if focused && field.checked.is_none() { "_" } else { "" };
            Line::from(vec![label, Span::raw(format!("{}{}", value, cursor))])
        })
        .collect()
}

fn draw_form(frame: &mut Frame, app: &App, form: &Form, area: Rect) {
    let strings = app.strings();
    let mut lines = form_lines(strings, form);
    if app.view() == View::ResetPassword && app.reset_step == ResetStep::Complete {
        lines.insert(0, Line::default());
        lines.insert(0, Line::from(dim(strings.notices.reset_sent)));
    }
    if app.busy {
        lines.push(Line::default());
        lines.push(Line::from(dim(strings.forms.working)));
    }
    frame.render_widget(Paragraph::new(lines), area);
}

fn draw_notification(frame: &mut Frame, app: &App, area: Rect) {
    let Some(note) = app.latest_notification() else {
        return;
    };
    let color = match note.level {
        Level::Info => Color::Cyan,
        Level::Success => Color::Green,
        Level::Error => Color::Red,
    };
    let mut spans = vec![Span::styled(
        format!(" {} ", note.title),
        Style::default().fg(Color::Black).bg(color),
    )];
    if !note.description.is_empty() {
        spans.push(Span::raw(format!(" {}", note.description)));
    }
    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

fn draw_status_bar(frame: &mut Frame, app: &App, area: Rect) {
    let hints = &app.strings().hints;
    let local = match app.view() {
        _ if app.search.is_some() => hints.search,
        View::Home => hints.home,
        View::Generator => hints.generator,
        View::Gallery => hints.gallery,
        View::Examples | View::Prompts => hints.list,
        View::Pricing => app.strings().pricing.buy_hint,
        View::Profile if app.session.is_signed_in() => hints.profile_signed_in,
        View::Profile => hints.profile_signed_out,
        View::Admin => hints.admin,
        View::Login => hints.login,
        View::Register | View::ResetPassword => hints.form,
        View::Faq | View::Support => "",
    };
    let status = format!(" {} | {} | {} ", app.lang.as_str().to_uppercase(), local, hints.global);
    let paragraph = Paragraph::new(status).style(Style::default().bg(Color::DarkGray).fg(Color::White));
    frame.render_widget(paragraph, area);
}

fn draw_search(frame: &mut Frame, app: &App, area: Rect) {
    let strings = app.strings();
    let Some(state) = &app.search else {
        return;
    };
    let hits = app.search_results();
    let height = if state.is_open() { hits.len().clamp(1, 10) as u16 + 3 } else { 3 };
    let popup = centered(area, 60, height);
    frame.render_widget(Clear, popup);

    let block = Block::default()
        .title(format!(" {} ", strings.search.placeholder))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Yellow));
    let inner = block.inner(popup);
    frame.render_widget(block, popup);

    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(1), Constraint::Min(0)])
        .split(inner);
    frame.render_widget(Paragraph::new(format!("{}_", state.query)), layout[0]);

    let rows = hits.iter().map(|hit| {
        let kind = match hit.category {
            Category::Section => strings.search.section,
            Category::Theme => strings.search.theme,
        };
        Line::from(vec![Span::raw(hit.label), dim(format!("  {}", kind))])
    });
    let mut list_state = ListState::default().with_selected(Some(state.selected.min(hits.len().saturating_sub(1))));
    frame.render_stateful_widget(selectable(rows), layout[1], &mut list_state);
}

fn centered(area: Rect, percent_x: u16, height: u16) -> Rect {
    let width = area.width * percent_x / 100;
    let height = height.min(area.height);
    Rect {
        x: area.x + (area.width.saturating_sub(width)) / 2,
        y: area.y + (area.height.saturating_sub(height)) / 3,
        width,
        height,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::{KeyCode, KeyModifiers};
    use ratatui::backend::TestBackend;
    use shared::{ImageSize, Language};

    fn render(app: &App) -> String {
        let mut terminal = Terminal::new(TestBackend::new(100, 30)).unwrap();
        terminal.draw(|f| draw(f, app)).unwrap();
        terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|c| c.symbol())
            .collect()
    }

    #[test]
    fn test_signed_out_nav_hides_admin() {
        let app = App::new(Language::En, ImageSize::Square, "dall-e-3");
        let screen = render(&app);
        assert!(screen.contains("Generator"));
        assert!(!screen.contains("Admin"));
        assert!(screen.contains("You are not signed in"));
    }

    #[test]
    fn test_search_popup_renders_hits() {
        let mut app = App::new(Language::En, ImageSize::Square, "dall-e-3");
        app.handle_key(KeyCode::Char('/'), KeyModifiers::NONE);
        for c in "vint".chars() {
            app.handle_key(KeyCode::Char(c), KeyModifiers::NONE);
        }
        let screen = render(&app);
        assert!(screen.contains("vint_"));
        assert!(screen.contains("Theme"));
    }

    #[test]
    fn test_russian_labels() {
        let mut app = App::new(Language::En, ImageSize::Square, "dall-e-3");
        app.handle_key(KeyCode::Char('l'), KeyModifiers::CONTROL);
        let screen = render(&app);
        assert!(screen.contains("Главная"));
    }
}
