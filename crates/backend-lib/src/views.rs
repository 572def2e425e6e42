// ============================
// assetreg-backend-lib/src/views.rs
// ============================
//! HTML pages.
//!
//! Every interpolated value goes through [`escape`].
use assetreg_common::AssetVariant;
use axum::http::StatusCode;
use url::form_urlencoded;

use crate::flash::Flash;
use crate::forms::{AssetForm, FormErrors, LoginForm, SignupForm};
use crate::models::{Asset, User};
use crate::validation::sanitize_string as escape;

const SITE_NAME: &str = "Asset Registry";

/// Who is looking at the page and what they should be told
#[derive(Debug, Default, Clone, Copy)]
pub struct PageContext<'a> {
    pub user: Option<&'a User>,
    pub flashes: &'a [Flash],
}

fn layout(title: &str, ctx: PageContext<'_>, body: &str) -> String {
    let nav = match ctx.user {
        Some(user) => format!(
            r#"<span class="user">Signed in as {}</span>
      <a href="/admin/asset/new">Register asset</a>
      <a href="/logout">Log out</a>"#,
            escape(&user.username)
        ),
        None => r#"<a href="/login">Log in</a>
      <a href="/signup">Sign up</a>"#
            .to_string(),
    };

    let flashes: String = ctx
        .flashes
        .iter()
        .map(|flash| {
            format!(
                r#"<div class="flash flash-{}">{}</div>"#,
                flash.level.as_str(),
                escape(&flash.message)
            )
        })
        .collect();

    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="utf-8">
  <title>{title} | {SITE_NAME}</title>
</head>
<body>
  <header>
    <a href="/">{SITE_NAME}</a>
    <nav>
      {nav}
    </nav>
  </header>
  <main>
    {flashes}
    {body}
  </main>
</body>
</html>
"#,
        title = escape(title),
    )
}

fn field_error(errors: &FormErrors, name: &str) -> String {
    errors
        .get(name)
        .map(|message| format!(r#"<span class="error">{}</span>"#, escape(message)))
        .unwrap_or_default()
}

fn general_errors(errors: &FormErrors) -> String {
    errors
        .general_messages()
        .iter()
        .map(|message| format!(r#"<p class="error">{}</p>"#, escape(message)))
        .collect()
}

fn text_input(label: &str, name: &str, kind: &str, value: &str, errors: &FormErrors) -> String {
    format!(
        r#"<p>
      <label for="{name}">{label}</label>
      <input id="{name}" name="{name}" type="{kind}" value="{value}">
      {error}
    </p>"#,
        value = escape(value),
        error = field_error(errors, name),
    )
}

fn asset_row(asset: &Asset) -> String {
    format!(
        r#"<li><a href="{url}">{name}</a> <small>{created}</small></li>"#,
        url = escape(&asset.public_url()),
        name = escape(&asset.name),
        created = asset.created_at.format("%Y-%m-%d"),
    )
}

/// `/`
pub fn index(assets: &[Asset], ctx: PageContext<'_>) -> String {
    let body = if assets.is_empty() {
        "<h1>Assets</h1>\n    <p>No assets have been registered yet.</p>".to_string()
    } else {
        let rows: String = assets.iter().map(asset_row).collect();
        format!("<h1>Assets</h1>\n    <ul class=\"assets\">{rows}</ul>")
    };
    layout("Assets", ctx, &body)
}

/// `/asset/{slug}/`
pub fn asset_detail(asset: &Asset, ctx: PageContext<'_>) -> String {
    let mut facts = String::new();
    if let Some(serial) = &asset.serial_number {
        facts.push_str(&format!("<dt>Serial number</dt><dd>{}</dd>", escape(serial)));
    }
    if let Some(value) = asset.display_value() {
        facts.push_str(&format!("<dt>Value</dt><dd>{value}</dd>"));
    }
    facts.push_str(&format!(
        "<dt>Registered</dt><dd>{}</dd>",
        asset.created_at.format("%Y-%m-%d %H:%M UTC")
    ));

    let body = format!(
        r#"<article class="asset">
      <h1>{name}</h1>
      <p>{description}</p>
      <dl>{facts}</dl>
    </article>"#,
        name = escape(&asset.name),
        description = escape(&asset.description),
    );
    layout(&asset.name, ctx, &body)
}

/// `/login`
pub fn login_form(
    form: &LoginForm,
    errors: &FormErrors,
    next: Option<&str>,
    ctx: PageContext<'_>,
) -> String {
    let action = match next {
        Some(next) => format!(
            "/login?next={}",
            form_urlencoded::byte_serialize(next.as_bytes()).collect::<String>()
        ),
        None => "/login".to_string(),
    };
    let checked = if form.remember() { " checked" } else { "" };

    let body = format!(
        r#"<h1>Log in</h1>
    {general}
    <form method="post" action="{action}">
    {email}
    {password}
    <p>
      <label><input name="remember_me" type="checkbox" value="y"{checked}> Remember me</label>
    </p>
    <p><button type="submit">Log in</button></p>
    </form>
    <p>No account yet? <a href="/signup">Sign up</a></p>"#,
        general = general_errors(errors),
        action = escape(&action),
        email = text_input("Email", "email", "email", &form.email, errors),
        password = text_input("Password", "password", "password", "", errors),
    );
    layout("Log in", ctx, &body)
}

/// `/signup`
pub fn signup_form(form: &SignupForm, errors: &FormErrors, ctx: PageContext<'_>) -> String {
    let body = format!(
        r#"<h1>Sign up</h1>
    {general}
    <form method="post" action="/signup">
    {username}
    {email}
    {password}
    {password2}
    <p><button type="submit">Register</button></p>
    </form>
    <p>Already registered? <a href="/login">Log in</a></p>"#,
        general = general_errors(errors),
        username = text_input("Username", "username", "text", &form.username, errors),
        email = text_input("Email", "email", "email", &form.email, errors),
        password = text_input("Password", "password", "password", "", errors),
        password2 = text_input("Repeat password", "password2", "password", "", errors),
    );
    layout("Sign up", ctx, &body)
}

/// `/admin/asset/new`
pub fn asset_form(
    form: &AssetForm,
    errors: &FormErrors,
    variant: AssetVariant,
    ctx: PageContext<'_>,
) -> String {
    let optional = |label: &str, required: bool| {
        if required {
            label.to_string()
        } else {
            format!("{label} (optional)")
        }
    };
    let serial = text_input(
        &optional("Serial number", variant.requires_serial_number()),
        "serial_number",
        "text",
        &form.serial_number,
        errors,
    );
    let value = text_input(
        &optional("Value", variant.requires_value()),
        "value",
        "text",
        &form.value,
        errors,
    );
    // The required field comes first
    let variant_fields = if variant.requires_serial_number() {
        format!("{serial}\n    {value}")
    } else {
        format!("{value}\n    {serial}")
    };

    let body = format!(
        r#"<h1>Register asset</h1>
    {general}
    <form method="post" action="/admin/asset/new">
    {name}
    {variant_fields}
    <p>
      <label for="description">Description</label>
      <textarea id="description" name="description" rows="5">{description}</textarea>
      {description_error}
    </p>
    <p><button type="submit">Save asset</button></p>
    </form>"#,
        general = general_errors(errors),
        name = text_input("Name", "name", "text", &form.name, errors),
        description = escape(&form.description),
        description_error = field_error(errors, "description"),
    );
    layout("Register asset", ctx, &body)
}

/// Rendered for unknown routes and slugs
pub fn not_found_page() -> String {
    layout(
        "Page not found",
        PageContext::default(),
        r#"<h1>Page not found</h1>
    <p>The page you were looking for does not exist. <a href="/">Back to the asset list</a></p>"#,
    )
}

pub fn error_page(status: StatusCode, code: &str, message: &str) -> String {
    let title = status.canonical_reason().unwrap_or("Error");
    let body = format!(
        r#"<h1>{title}</h1>
    <p>{message}</p>
    <p><small>Error code {code}</small></p>"#,
        title = escape(title),
        message = escape(message),
        code = escape(code),
    );
    layout(title, PageContext::default(), &body)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn asset(name: &str) -> Asset {
        Asset {
            id: 1,
            user_id: 1,
            name: name.to_string(),
            description: "Needs <b>care</b> & oil".to_string(),
            serial_number: Some("SN-1".to_string()),
            value_cents: Some(125_050),
            slug: "forklift".to_string(),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_detail_escapes_user_content() {
        let html = asset_detail(&asset("<script>x</script>"), PageContext::default());
        assert!(html.contains("&lt;script&gt;x&lt;/script&gt;"));
        assert!(html.contains("Needs &lt;b&gt;care&lt;/b&gt; &amp; oil"));
        assert!(html.contains("1250.50"));
        assert!(!html.contains("<script>"));
    }

    #[test]
    fn test_index_links_to_detail_pages() {
        let html = index(&[asset("Forklift")], PageContext::default());
        assert!(html.contains(r#"href="/asset/forklift/""#));
        assert!(html.contains("Log in"));

        let empty = index(&[], PageContext::default());
        assert!(empty.contains("No assets have been registered yet."));
    }

    #[test]
    fn test_nav_reflects_signed_in_user() {
        let user = User {
            id: 1,
            username: "alice".to_string(),
            email: "alice@example.com".to_string(),
            password_hash: String::new(),
        };
        let flashes = [Flash::info("Welcome back")];
        let ctx = PageContext {
            user: Some(&user),
            flashes: &flashes,
        };
        let html = index(&[], ctx);
        assert!(html.contains("Signed in as alice"));
        assert!(html.contains("/logout"));
        assert!(html.contains(r#"class="flash flash-info">Welcome back"#));
    }

    #[test]
    fn test_login_form_keeps_next() {
        let html = login_form(
            &LoginForm::default(),
            &FormErrors::message("Invalid email or password."),
            Some("/admin/asset/new?x=1"),
            PageContext::default(),
        );
        assert!(html.contains(r#"action="/login?next=%2Fadmin%2Fasset%2Fnew%3Fx%3D1""#));
        assert!(html.contains("Invalid email or password."));
    }

    #[test]
    fn test_asset_form_marks_the_optional_field() {
        let serial = asset_form(
            &AssetForm::default(),
            &FormErrors::default(),
            AssetVariant::Serial,
            PageContext::default(),
        );
        assert!(serial.contains(r#"name="serial_number""#));
        assert!(serial.contains(r#"name="value""#));
        assert!(serial.contains("Value (optional)"));
        assert!(!serial.contains("Serial number (optional)"));

        let valued = asset_form(
            &AssetForm::default(),
            &FormErrors::default(),
            AssetVariant::Valued,
            PageContext::default(),
        );
        assert!(valued.contains("Serial number (optional)"));
        assert!(valued.find(r#"name="value""#) < valued.find(r#"name="serial_number""#));
    }

    #[test]
    fn test_error_pages() {
        assert!(not_found_page().contains("Page not found"));
        let html = error_page(StatusCode::CONFLICT, "SLUG_001", "try <again>");
        assert!(html.contains("Conflict"));
        assert!(html.contains("try &lt;again&gt;"));
    }
}
