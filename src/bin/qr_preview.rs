//! Terminal preview of a ticket QR code with its expiry countdown.
//!
//! Usage: `qr_preview <data> [--png <path>]`
//!
//! Press Enter at any time to regenerate the code, or type `q` to quit.

use std::io::Write as _;

use color_eyre::eyre::{WrapErr, eyre};
use ticket_qr_gateway::{
    config::Config,
    qr::{QrRenderer, QrSession, QrState, format_remaining},
    telemetry,
};
use tokio::io::{AsyncBufReadExt, BufReader};

#[tokio::main]
async fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;
    dotenvy::dotenv().ok();
    telemetry::init_tracing();

    let mut args = std::env::args().skip(1);
    let data = args
        .next()
        .ok_or_else(|| eyre!("usage: qr_preview <data> [--png <path>]"))?;
    let png_path = match (args.next().as_deref(), args.next()) {
        (Some("--png"), Some(path)) => Some(path),
        (None, _) => None,
        _ => return Err(eyre!("usage: qr_preview <data> [--png <path>]")),
    };

    let config = Config::load()?;
    let renderer = QrRenderer::default();
    let mut session = QrSession::start(renderer.clone(), data, config.qr.validity())?;
    let mut stdin = BufReader::new(tokio::io::stdin()).lines();
    let mut state = session.subscribe();

    show(&session, &renderer, png_path.as_deref())?;
    loop {
        tokio::select! {
            changed = state.changed() => {
                if changed.is_err() {
                    break;
                }
                match *state.borrow_and_update() {
                    QrState::Active { remaining_secs } => {
                        print!("\rexpires in {}  ", format_remaining(remaining_secs));
                        std::io::stdout().flush()?;
                    }
                    QrState::Expired => {
                        println!("\rQR code expired. Press Enter to regenerate or type q to quit.");
                    }
                    QrState::Loading => {}
                }
            }
            line = stdin.next_line() => match line? {
                Some(line) if line.trim() == "q" => break,
                None => break,
                Some(_) => {
                    session.refresh()?;
                    show(&session, &renderer, png_path.as_deref())?;
                }
            },
        }
    }

    Ok(())
}

fn show(session: &QrSession, renderer: &QrRenderer, png_path: Option<&str>) -> color_eyre::Result<()> {
    let Some(rendered) = session.current() else {
        return Err(eyre!("no QR code rendered"));
    };
    println!("\n{}", renderer.render_terminal(&rendered.payload)?);
    println!("tag {} expires at {}", rendered.payload.tag, rendered.payload.expires_at);
    if let Some(path) = png_path {
        std::fs::write(path, &rendered.image.bytes)
            .wrap_err_with(|| format!("Writing PNG to {path}"))?;
        println!("PNG written to {path}");
    }
    Ok(())
}
