use anyhow::{Context, Result};
use chrono::Local;
use emocal_calendar::ViewState;
use emocal_ui::command::{self, Command, HELP};
use emocal_ui::{
    render_calendar, render_day_sheet, render_state, CalendarModel, ModelSettings,
    WeatherServices,
};
use tokio::io::{stdin, AsyncBufReadExt, BufReader};

enum Flow {
    Render,
    Quiet,
    Quit,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    emocal_core::init()?;

    let mut app = emocal_core::App::new().context("Failed to load configuration")?;
    let settings = ModelSettings::from_config(app.config())
        .context("Invalid weather code table in configuration")?;
    let services = WeatherServices::from_config(app.config(), tokio::runtime::Handle::current());

    let today = Local::now().date_naive();
    let view = ViewState::for_today(today).context("Today is outside the supported calendar")?;
    let default_city = settings.default_city.clone();

    let mut model = CalendarModel::new(view, today, settings, services);
    if !default_city.is_empty() {
        model.search_city(&default_city);
    }

    tracing::info!("emocal started");
    println!("{}", HELP);
    render(&model);

    let mut lines = BufReader::new(stdin()).lines();
    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line.context("Failed to read stdin")? else {
                    break;
                };
                model.set_today(Local::now().date_naive());
                match handle(&mut model, &line) {
                    Flow::Render => render(&model),
                    Flow::Quiet => {}
                    Flow::Quit => break,
                }
            }
            Some(msg) = model.next_message() => {
                if model.apply(msg) {
                    model.poll_channel();
                    render(&model);
                }
            }
        }
    }

    app.shutdown()?;
    Ok(())
}

fn handle(model: &mut CalendarModel, line: &str) -> Flow {
    let command = match command::parse(line) {
        Ok(Some(command)) => command,
        Ok(None) => return Flow::Render,
        Err(e) => {
            eprintln!("{}", e);
            return Flow::Quiet;
        }
    };

    let result = match command {
        Command::Next => model.change_month(1).map_err(|e| e.user_message()),
        Command::Prev => model.change_month(-1).map_err(|e| e.user_message()),
        Command::Today => model.go_to_today().map_err(|e| e.user_message()),
        Command::City(name) => {
            model.search_city(&name);
            Ok(())
        }
        Command::Day(arg) => match arg.resolve(model.view().month) {
            Ok(date) if model.select_date(date) => Ok(()),
            Ok(date) => Err(format!("No forecast for {}", date.format("%Y-%m-%d"))),
            Err(e) => Err(e.to_string()),
        },
        Command::Close => {
            model.close_day();
            Ok(())
        }
        Command::Refresh => {
            model.refresh();
            Ok(())
        }
        Command::State => {
            match render_state(model) {
                Ok(json) => println!("{}", json),
                Err(e) => tracing::error!("Failed to serialize view state: {}", e),
            }
            return Flow::Quiet;
        }
        Command::Help => {
            println!("{}", HELP);
            return Flow::Quiet;
        }
        Command::Quit => return Flow::Quit,
    };

    match result {
        Ok(()) => Flow::Render,
        Err(message) => {
            eprintln!("{}", message);
            Flow::Quiet
        }
    }
}

fn render(model: &CalendarModel) {
    println!();
    println!("{}", render_calendar(model));
    if let Some(sheet) = model.day_sheet() {
        println!();
        println!("{}", render_day_sheet(&sheet));
    }
}
