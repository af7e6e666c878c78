use anyhow::Context;
use clap::{value_parser, Arg, ArgAction, ArgMatches, Command};
use confstore_app::prelude::*;
use confstore_app::terminal::{self, StderrNotifier, StdinPrompt};
use confstore_app::{AcceptPrompt, UnmountHandle};
use std::future::Future;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

const EXIT_VIEW_ERROR: u8 = 1;
const EXIT_REDIRECT: u8 = 2;

fn cli() -> Command {
    let id = || Arg::new("id").required(true).help("Config id");
    let attach = || {
        Arg::new("attach")
            .long("attach")
            .value_parser(value_parser!(PathBuf))
            .help("File to attach")
    };
    let yes = || {
        Arg::new("yes")
            .long("yes")
            .short('y')
            .action(ArgAction::SetTrue)
            .help("Do not ask for confirmation")
    };

    Command::new("confstore")
        .version(confstore_app::VERSION)
        .about("Config store client")
        .subcommand_required(true)
        .arg(
            Arg::new("config")
                .long("config")
                .global(true)
                .value_parser(value_parser!(PathBuf))
                .help("Path to the client configuration file"),
        )
        .subcommand(Command::new("list").about("List your configs"))
        .subcommand(Command::new("show").about("Show one config").arg(id()))
        .subcommand(
            Command::new("create")
                .about("Create a new config")
                .arg(
                    Arg::new("name")
                        .long("name")
                        .default_value("")
                        .help("Config name"),
                )
                .arg(
                    Arg::new("content")
                        .long("content")
                        .required(true)
                        .help("Config content"),
                )
                .arg(attach()),
        )
        .subcommand(
            Command::new("edit")
                .about("Change the content or attachment of a config")
                .arg(id())
                .arg(Arg::new("content").long("content").help("New content"))
                .arg(attach()),
        )
        .subcommand(
            Command::new("delete")
                .about("Delete a config")
                .arg(id())
                .arg(yes()),
        )
        .subcommand(
            Command::new("rollback")
                .about("Roll a config back to its previous version")
                .arg(id())
                .arg(yes()),
        )
        .subcommand(
            Command::new("route")
                .about("Show how a path resolves for the current session")
                .arg(Arg::new("path").required(true).help("Path such as /config/new")),
        )
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> ExitCode {
    init_tracing();

    match run(&cli().get_matches()).await {
        Ok(code) => code,
        Err(err) => {
            eprintln!("error: {err:#}");
            ExitCode::FAILURE
        }
    }
}

async fn run(matches: &ArgMatches) -> anyhow::Result<ExitCode> {
    let config_path = matches.get_one::<PathBuf>("config").map(PathBuf::as_path);
    let config = AppConfig::resolve(config_path).context("loading configuration")?;

    let session = Session::anonymous();
    if let Some(credentials) = config.credentials() {
        session.sign_in(credentials);
    }
    let router = Router::new(session.reader());

    let ctx = AppContext::from_config(&config, session.reader())
        .context("building HTTP clients")?
        .with_notifier(Arc::new(StderrNotifier))
        .with_prompt(Arc::new(StdinPrompt));

    let mut stdout = std::io::stdout().lock();
    match matches.subcommand() {
        Some(("route", args)) => {
            let path = required(args, "path")?;
            terminal::write_resolution(&mut stdout, &router.resolve(path))?;
            Ok(ExitCode::SUCCESS)
        }
        Some(("list", _)) => {
            if let Err(code) = enter(&router, "/") {
                return Ok(code);
            }
            let mut view = ListView::new(ctx);
            let handle = view.lifetime().handle();
            let Some(result) = until_interrupted(handle, view.mount()).await else {
                return Ok(ExitCode::from(EXIT_VIEW_ERROR));
            };
            terminal::write_list(&mut stdout, &view.render())?;
            Ok(exit_code(result))
        }
        Some(("show", args)) => {
            let view = match mount_detail(&router, ctx, args).await? {
                Ok(view) => view,
                Err(code) => return Ok(code),
            };
            if let Some(form) = view.render() {
                terminal::write_detail(&mut stdout, &form)?;
            }
            Ok(ExitCode::SUCCESS)
        }
        Some(("create", args)) => {
            if let Err(code) = enter(&router, "/config/new") {
                return Ok(code);
            }
            let mut view = CreateView::new(ctx);
            view.set_config_name(required(args, "name")?);
            view.set_content(required(args, "content")?);
            if let Some(path) = args.get_one::<PathBuf>("attach") {
                view.pick_file(open(path).await?);
            }
            let handle = view.lifetime().handle();
            let outcome = until_interrupted(handle, view.submit()).await;
            match outcome {
                Some(Ok(route)) => navigate(&mut stdout, &route),
                Some(Err(err)) => {
                    eprintln!("not created, draft kept:");
                    terminal::write_create(&mut std::io::stderr(), &view.render())?;
                    Ok(exit_code(Err(err)))
                }
                None => Ok(ExitCode::from(EXIT_VIEW_ERROR)),
            }
        }
        Some(("edit", args)) => {
            let mut view = match mount_detail(&router, ctx, args).await? {
                Ok(view) => view,
                Err(code) => return Ok(code),
            };
            if let Some(content) = args.get_one::<String>("content") {
                view.set_content(content.as_str());
            }
            if let Some(path) = args.get_one::<PathBuf>("attach") {
                view.pick_file(open(path).await?);
            }
            let handle = view.lifetime().handle();
            match until_interrupted(handle, view.save()).await {
                Some(Ok(route)) => navigate(&mut stdout, &route),
                Some(Err(err)) => Ok(exit_code(Err(err))),
                None => Ok(ExitCode::from(EXIT_VIEW_ERROR)),
            }
        }
        Some((op @ ("delete" | "rollback"), args)) => {
            let ctx = if args.get_flag("yes") {
                ctx.with_prompt(Arc::new(AcceptPrompt))
            } else {
                ctx
            };
            let mut view = match mount_detail(&router, ctx, args).await? {
                Ok(view) => view,
                Err(code) => return Ok(code),
            };
            let handle = view.lifetime().handle();
            let outcome = if op == "delete" {
                until_interrupted(handle, view.delete()).await
            } else {
                until_interrupted(handle, view.rollback()).await
            };
            match outcome {
                Some(Ok(Some(route))) => navigate(&mut stdout, &route),
                Some(Ok(None)) => {
                    eprintln!("cancelled");
                    Ok(ExitCode::SUCCESS)
                }
                Some(Err(err)) => Ok(exit_code(Err(err))),
                None => Ok(ExitCode::from(EXIT_VIEW_ERROR)),
            }
        }
        _ => anyhow::bail!("unknown command"),
    }
}

/// Resolve `target`, printing the redirect if the guard refuses it
fn enter(router: &Router, target: &str) -> Result<Route, ExitCode> {
    match router.resolve(target) {
        Resolution::Render(route) => Ok(route),
        Resolution::Redirect(to) => {
            eprintln!("not allowed here, redirecting to {to}");
            Err(ExitCode::from(EXIT_REDIRECT))
        }
    }
}

/// Guard and mount the detail view for the `id` argument
async fn mount_detail(
    router: &Router,
    ctx: AppContext,
    args: &ArgMatches,
) -> anyhow::Result<Result<DetailView, ExitCode>> {
    let id = required(args, "id")?;
    let target = Route::Config(ConfigId::new(id)).path();
    let mut view = match enter(router, &target) {
        Ok(Route::Config(id)) => DetailView::new(ctx, id),
        Ok(other) => anyhow::bail!("{id:?} is not a config id (resolves to {other})"),
        Err(code) => return Ok(Err(code)),
    };

    let handle = view.lifetime().handle();
    let outcome = until_interrupted(handle, view.mount()).await;
    Ok(match outcome {
        Some(Ok(())) => Ok(view),
        Some(Err(err)) => Err(exit_code(Err(err))),
        None => Err(ExitCode::from(EXIT_VIEW_ERROR)),
    })
}

/// Run `op`, unmounting its view on Ctrl-C
async fn until_interrupted<F: Future>(handle: UnmountHandle, op: F) -> Option<F::Output> {
    tokio::select! {
        output = op => Some(output),
        _ = tokio::signal::ctrl_c() => {
            handle.unmount();
            tracing::warn!("interrupted");
            None
        }
    }
}

async fn open(path: &Path) -> anyhow::Result<LocalFile> {
    LocalFile::open(path)
        .await
        .with_context(|| format!("opening {}", path.display()))
}

fn required<'a>(args: &'a ArgMatches, name: &str) -> anyhow::Result<&'a str> {
    args.get_one::<String>(name)
        .map(String::as_str)
        .with_context(|| format!("missing --{name}"))
}

fn navigate(out: &mut impl std::io::Write, route: &Route) -> anyhow::Result<ExitCode> {
    writeln!(out, "{route}")?;
    Ok(ExitCode::SUCCESS)
}

fn exit_code(result: Result<(), ViewError>) -> ExitCode {
    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            if !(err.is_remote() || err.is_validation()) {
                eprintln!("error: {err}");
            }
            ExitCode::from(EXIT_VIEW_ERROR)
        }
    }
}
