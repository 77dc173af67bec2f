//! Bios: what users write about themselves, and what others write about them.

mod repository;

pub use repository::{InMemoryUserInfo, UserInfoRepository};

use std::sync::Arc;

use warden_core::{ParseMode, User, UserId, escape_html};
use warden_framework::prelude::*;
use warden_framework::DEFAULT_GROUP;

use crate::access::Privileges;
use crate::error::ModuleResult;

const MAX_MESSAGE_LENGTH: usize = 4096;

/// Longest accepted info or bio, in characters (exclusive).
pub const MAX_TEXT_LENGTH: usize = MAX_MESSAGE_LENGTH / 4;

const HELP: &str = "\
Writing something about yourself is cool, whether to make people know about yourself or \
promoting your profile.

All bios are displayed on /info command.

 - /setbio &lt;text&gt;: while replying, will save another user's bio
 - /bio: will get your or another user's bio. This cannot be set by yourself.
 - /setme &lt;text&gt;: will set your info
 - /me: will get your or another user's info

An example of setting a bio for yourself:
<code>/setme I work for Telegram</code>; Bio is set to yourself.

An example of writing someone else' bio:
Reply to user's message: <code>/setbio He is such cool person</code>.

<b>Notice:</b> Do not use /setbio against yourself!";

/// The "Bios" module.
pub struct Bios {
    repo: Arc<dyn UserInfoRepository>,
    privileges: Arc<Privileges>,
}

impl Bios {
    pub fn new(repo: Arc<dyn UserInfoRepository>, privileges: Privileges) -> Self {
        Self {
            repo,
            privileges: Arc::new(privileges),
        }
    }

    /// A module backed by [`InMemoryUserInfo`].
    pub fn in_memory(privileges: Privileges) -> Self {
        Self::new(Arc::new(InMemoryUserInfo::new()), privileges)
    }

    pub fn repository(&self) -> &Arc<dyn UserInfoRepository> {
        &self.repo
    }
}

impl Module for Bios {
    fn descriptor(&self) -> ModuleDescriptor {
        let info_repo = Arc::clone(&self.repo);
        let gdpr_repo = Arc::clone(&self.repo);

        ModuleDescriptor::new("Bios")
            .help(HELP)
            .on_user_info(move |user| {
                let repo = Arc::clone(&info_repo);
                async move { Ok(info_section(repo.as_ref(), user).await?) }
            })
            .on_gdpr(move |user| {
                let repo = Arc::clone(&gdpr_repo);
                async move { Ok(repo.forget(user).await?) }
            })
    }

    fn register_handlers(&self, table: &mut HandlerTable) {
        let repo = Arc::clone(&self.repo);
        table.add(
            DEFAULT_GROUP,
            Handler::new(command(&["setme"]), move |ctx| set_about_me(ctx, Arc::clone(&repo)))
                .named("bios.setme"),
        );

        let repo = Arc::clone(&self.repo);
        table.add(
            DEFAULT_GROUP,
            Handler::new(command(&["me"]), move |ctx| about_me(ctx, Arc::clone(&repo)))
                .named("bios.me"),
        );

        let repo = Arc::clone(&self.repo);
        let privileges = Arc::clone(&self.privileges);
        table.add(
            DEFAULT_GROUP,
            Handler::new(command(&["setbio"]), move |ctx| {
                set_about_bio(ctx, Arc::clone(&repo), Arc::clone(&privileges))
            })
            .named("bios.setbio"),
        );

        let repo = Arc::clone(&self.repo);
        table.add(
            DEFAULT_GROUP,
            Handler::new(command(&["bio"]), move |ctx| about_bio(ctx, Arc::clone(&repo)))
                .named("bios.bio"),
        );
    }
}

/// The `/info` section for a user, or `None` when nothing is known.
pub fn user_info_text(me: Option<&str>, bio: Option<&str>) -> Option<String> {
    let me = me.filter(|t| !t.is_empty()).map(escape_html);
    let bio = bio.filter(|t| !t.is_empty()).map(escape_html);
    match (me, bio) {
        (Some(me), Some(bio)) => Some(format!(
            "<b>About user:</b>\n{me}\n<b>What others say:</b>\n{bio}"
        )),
        (None, Some(bio)) => Some(format!("<b>What others say:</b>\n{bio}\n")),
        (Some(me), None) => Some(format!("<b>About user:</b>\n{me}")),
        (None, None) => None,
    }
}

/// Reads both texts of `user` and renders the `/info` section.
pub async fn info_section(
    repo: &dyn UserInfoRepository,
    user: UserId,
) -> ModuleResult<Option<String>> {
    let me = repo.me(user).await?;
    let bio = repo.bio(user).await?;
    Ok(user_info_text(me.as_deref(), bio.as_deref()))
}

/// The user a lookup is about: the replied-to sender, a numeric id
/// argument, or the sender.
fn target(ctx: &DispatchContext) -> Option<User> {
    let replied = ctx
        .update()
        .effective_message()
        .and_then(|m| m.reply_to.as_deref())
        .and_then(|m| m.from.clone());
    if replied.is_some() {
        return replied;
    }
    if let Some(id) = ctx.args().first().and_then(|arg| arg.parse::<i64>().ok()) {
        return Some(User::new(id, ""));
    }
    ctx.user().cloned()
}

fn display_name(user: &User) -> String {
    if user.first_name.is_empty() {
        user.id.to_string()
    } else {
        user.first_name.clone()
    }
}

/// The command's text argument, newlines kept.
fn text_argument(ctx: &DispatchContext) -> Option<String> {
    ctx.command()
        .map(|c| c.raw_args.clone())
        .filter(|args| !args.is_empty())
}

async fn show(
    ctx: &DispatchContext,
    target: &User,
    text: Option<String>,
    missing_other: &str,
    missing_self: &str,
) -> ActionResult {
    let is_self = ctx.user().is_some_and(|u| u.id == target.id);
    match text {
        Some(text) => {
            let body = format!(
                "<b>{}</b>:\n{}",
                escape_html(&display_name(target)),
                escape_html(&text)
            );
            ctx.reply(&body, ParseMode::Html, None).await?;
        }
        None if !is_self => {
            ctx.reply_text(&format!("{} {missing_other}", display_name(target)))
                .await?;
        }
        None => {
            ctx.reply_text(missing_self).await?;
        }
    }
    Ok(Outcome::Continue)
}

async fn about_me(ctx: Arc<DispatchContext>, repo: Arc<dyn UserInfoRepository>) -> ActionResult {
    let Some(target) = target(&ctx) else {
        return Ok(Outcome::Continue);
    };
    let info = repo.me(target.id).await?;
    show(
        &ctx,
        &target,
        info,
        "hasn't set an info message about themselves yet!",
        "You haven't set an info message about yourself yet!",
    )
    .await
}

async fn about_bio(ctx: Arc<DispatchContext>, repo: Arc<dyn UserInfoRepository>) -> ActionResult {
    let Some(target) = target(&ctx) else {
        return Ok(Outcome::Continue);
    };
    let bio = repo.bio(target.id).await?;
    show(
        &ctx,
        &target,
        bio,
        "hasn't had a message set about themselves yet!",
        "You haven't had a bio set about yourself yet!",
    )
    .await
}

async fn set_about_me(
    ctx: Arc<DispatchContext>,
    repo: Arc<dyn UserInfoRepository>,
) -> ActionResult {
    let (Some(user), Some(info)) = (ctx.user().map(|u| u.id), text_argument(&ctx)) else {
        return Ok(Outcome::Continue);
    };

    let length = info.chars().count();
    if length < MAX_TEXT_LENGTH {
        repo.set_me(user, &info).await?;
        ctx.reply_text("Updated your info!").await?;
    } else {
        ctx.reply_text(&format!(
            "Your info needs to be under {MAX_TEXT_LENGTH} characters! You have {length}."
        ))
        .await?;
    }
    Ok(Outcome::Continue)
}

async fn set_about_bio(
    ctx: Arc<DispatchContext>,
    repo: Arc<dyn UserInfoRepository>,
    privileges: Arc<Privileges>,
) -> ActionResult {
    let Some(sender) = ctx.user().map(|u| u.id) else {
        return Ok(Outcome::Continue);
    };
    let Some(target) = ctx
        .update()
        .effective_message()
        .and_then(|m| m.reply_to.as_deref())
        .and_then(|m| m.from.clone())
    else {
        ctx.reply_text("Reply to someone's message to set their bio!")
            .await?;
        return Ok(Outcome::Continue);
    };

    if target.id == sender {
        ctx.reply_text("Ha, you can't set your own bio! You're at the mercy of others here...")
            .await?;
        return Ok(Outcome::Continue);
    }
    if target.id == ctx.bot().id() && !privileges.is_sudo(sender) {
        ctx.reply_text("Erm... yeah, I only trust sudo users to set my bio.")
            .await?;
        return Ok(Outcome::Continue);
    }

    let Some(bio) = text_argument(&ctx) else {
        return Ok(Outcome::Continue);
    };
    let length = bio.chars().count();
    if length < MAX_TEXT_LENGTH {
        repo.set_bio(target.id, &bio).await?;
        ctx.reply_text(&format!("Updated {}'s bio!", display_name(&target)))
            .await?;
    } else {
        ctx.reply_text(&format!(
            "A bio needs to be under {MAX_TEXT_LENGTH} characters! You tried to set {length}."
        ))
        .await?;
    }
    Ok(Outcome::Continue)
}
