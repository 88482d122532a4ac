//! Signed-in account handlers.

use motorlog_core::{Garage, ProfileUpdate, User};

use crate::cli::{AccountArgs, AccountCommand, GlobalOpts};
use crate::error::CliError;
use crate::output;

fn user_detail(u: &User) -> String {
    output::detail_block(&[
        ("ID", u.id.to_string()),
        ("Name", u.name.clone()),
        ("Email", u.email.clone()),
        ("Phone", output::opt(u.phone.as_ref())),
        ("Language", output::opt(u.locale.as_ref())),
    ])
}

pub async fn handle(
    garage: &Garage,
    args: AccountArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    match args.command {
        AccountCommand::Show => {
            let fetched = garage.get_user().await?;
            output::print_source(global, &fetched.source);
            let out = output::render_single(&global.output, &fetched.data, user_detail, |u| {
                u.email.clone()
            });
            output::print_output(&out, global.quiet);
            Ok(())
        }

        AccountCommand::Update {
            name,
            phone,
            language,
        } => {
            if name.is_none() && phone.is_none() && language.is_none() {
                return Err(CliError::Validation {
                    field: "update".into(),
                    reason: "pass at least one of --name, --phone, --language".into(),
                });
            }
            let update = ProfileUpdate {
                name,
                phone,
                locale: language,
            };
            let user = garage.update_profile(&update).await?;
            let out = output::render_single(&global.output, &user, user_detail, |u| {
                u.email.clone()
            });
            output::print_output(&out, global.quiet);
            Ok(())
        }
    }
}
