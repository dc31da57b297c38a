use clap::Subcommand;
use serde_json::json;

use crate::auth::RegistrationForm;
use crate::cli::utils::{connect_state, output_success};
use crate::cli::OutputFormat;

#[derive(Subcommand)]
pub enum UserCommands {
    #[command(about = "Register a new user account")]
    Add {
        #[arg(help = "Username")]
        username: String,
        #[arg(help = "Email address")]
        email: String,
        #[arg(long, help = "Password for the new account")]
        password: String,
    },
}

pub async fn handle(cmd: UserCommands, output_format: OutputFormat) -> anyhow::Result<()> {
    match cmd {
        UserCommands::Add {
            username,
            email,
            password,
        } => {
            let state = connect_state().await?;
            state.ensure_schema().await?;

            let user = state
                .credentials
                .register(RegistrationForm {
                    username,
                    email,
                    password2: password.clone(),
                    password,
                })
                .await?;

            output_success(
                &output_format,
                &format!("User '{}' registered", user.username),
                Some(json!({ "id": user.id, "username": user.username, "email": user.email })),
            )
        }
    }
}
