//! Keystone interactive console.
//!
//! Usage:
//!   keystone-console --verbose
//!
//! Entities live in process memory; nothing survives exit. Session tokens
//! are signed with a random secret unless `--session-secret` pins one.

use anyhow::{anyhow, Result};
use clap::Parser;
use keystone_console::{parse_line, Command};
use keystone_credential::CredentialManager;
use keystone_engine::{AccountService, CommandEngine, EngineError, LogNotifier, Notifier};
use keystone_model::TypeRegistry;
use keystone_session::{SessionSigner, SECRET_SIZE};
use keystone_store::{EntityStore, MemoryEntityStore, MemoryTokenStore, TokenStore};
use keystone_token::TokenLifecycleManager;
use keystone_types::EntityId;
use std::io::Write as _;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

#[derive(Parser, Debug)]
#[command(name = "keystone-console")]
#[command(about = "Interactive console for the Keystone entity engine")]
struct Args {
    /// Hex-encoded 32-byte session signing secret (random if omitted)
    #[arg(long)]
    session_secret: Option<String>,

    /// Enable verbose debug logging
    #[arg(short, long)]
    verbose: bool,
}

struct Console {
    engine: Arc<CommandEngine>,
    accounts: AccountService,
    signer: SessionSigner,
    session: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let log_level = if args.verbose { Level::DEBUG } else { Level::INFO };
    FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_target(false)
        .compact()
        .init();

    let signer = match &args.session_secret {
        Some(raw) => SessionSigner::new(parse_secret(raw)?),
        None => SessionSigner::from_random(),
    };

    let entity_store: Arc<dyn EntityStore> = Arc::new(MemoryEntityStore::new());
    let token_store: Arc<dyn TokenStore> = Arc::new(MemoryTokenStore::new());
    let tokens = Arc::new(TokenLifecycleManager::new(token_store));
    let notifier: Arc<dyn Notifier> = Arc::new(LogNotifier);
    let credentials = CredentialManager::with_defaults();

    let engine = Arc::new(CommandEngine::new(
        Arc::new(TypeRegistry::builtin()),
        Arc::clone(&entity_store),
        Arc::clone(&tokens),
        credentials.clone(),
        Arc::clone(&notifier),
    ));
    let accounts = AccountService::new(
        Arc::clone(&engine),
        entity_store,
        tokens,
        credentials,
        signer.clone(),
        notifier,
    );
    let mut console = Console {
        engine,
        accounts,
        signer,
        session: None,
    };

    println!("Keystone console. Type `help` for commands, `quit` to exit.");
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        print!("> ");
        std::io::stdout().flush()?;
        let Some(line) = lines.next_line().await? else {
            break;
        };
        match parse_line(&line) {
            Ok(None) => {}
            Ok(Some(Command::Quit)) => break,
            Ok(Some(command)) => {
                if let Err(e) = console.run(command).await {
                    println!("error: {e}");
                }
            }
            Err(e) => println!("{e}"),
        }
    }
    Ok(())
}

impl Console {
    async fn run(&mut self, command: Command) -> Result<(), EngineError> {
        match command {
            Command::Create { entity, attrs } => {
                let id = self.engine.create(&entity, &attrs).await?;
                println!("created {entity} {id}");
            }
            Command::Show { entity, id } => {
                let view = self.engine.show(&entity, id).await?;
                println!("{view}");
            }
            Command::Update { entity, id, attrs } => {
                self.engine.update(&entity, id, &attrs).await?;
                println!("updated {entity} {id}");
            }
            Command::Destroy { entity, id } => {
                self.engine.destroy(&entity, id).await?;
                println!("destroyed {entity} {id}");
            }
            Command::All { entity } => {
                let views = self.engine.all(&entity).await?;
                if views.is_empty() {
                    println!("no {entity} entities");
                }
                for view in views {
                    println!("{view}");
                }
            }
            Command::Register {
                username,
                password,
                email,
            } => {
                let id = self.accounts.register(&username, &password, &email).await?;
                println!("registered User {id}");
            }
            Command::Login { username, password } => {
                let token = self.accounts.authenticate(&username, &password).await?;
                println!("session: {token}");
                self.session = Some(token);
            }
            Command::Logout => {
                self.session = None;
                println!("logged out");
            }
            Command::Whoami => match self.subject() {
                Some(id) => println!("User {id}"),
                None => println!("not logged in"),
            },
            Command::Passwd { old, new } => match self.subject() {
                Some(id) => {
                    self.accounts.change_password(id, &old, &new).await?;
                    println!("password changed");
                }
                None => println!("not logged in"),
            },
            Command::RequestReset { email } => {
                self.accounts.request_password_reset(&email).await?;
                println!("if the address is known, a reset token has been sent");
            }
            Command::Reset { token, password } => {
                self.accounts.consume_password_reset(&token, &password).await?;
                println!("password reset");
            }
            Command::Verify { token } => {
                let id = self.accounts.consume_email_verification(&token).await?;
                println!("verified User {id}");
            }
            Command::Help => self.print_help(),
            Command::Quit => {}
        }
        Ok(())
    }

    /// The subject of the current session, if one is held and still valid.
    fn subject(&self) -> Option<EntityId> {
        let token = self.session.as_deref()?;
        self.signer.validate(token).ok()
    }

    fn print_help(&self) {
        println!("entity commands:");
        println!("  create <Type> [Field=value]...");
        println!("  show <Type> <id>");
        println!("  update <Type> <id> <Field=value>...");
        println!("  destroy <Type> <id>");
        println!("  all <Type>");
        println!("account commands:");
        println!("  register <username> <password> <email>");
        println!("  login <username> <password>");
        println!("  logout | whoami");
        println!("  passwd <old-password> <new-password>");
        println!("  request-reset <email>");
        println!("  reset <token> <new-password>");
        println!("  verify <token>");
        let names: Vec<&str> = self.engine.registry().names().collect();
        println!("registered types: {}", names.join(", "));
    }
}

fn parse_secret(raw: &str) -> Result<[u8; SECRET_SIZE]> {
    let bytes = hex::decode(raw)?;
    bytes
        .try_into()
        .map_err(|_| anyhow!("session secret must be {SECRET_SIZE} bytes of hex"))
}
