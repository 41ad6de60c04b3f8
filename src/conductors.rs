use std::sync::Arc;

use anyhow::{anyhow, Result};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};

use crate::cmds::{parse_line, Cmd, OpenCmd, RootMod, ShowCmd, SlotCmd};
use crate::constructors::Services;
use crate::controllers::PostStatsController;
use crate::presenters::{StatsView, Surface};
use crate::session::Session;
use crate::usecases::post::get;
use crate::utils::SwallowErr;

/// owns the mounted widgets and turns commands into controller calls.
///
/// slot numbers stay stable while mounted; `open` reuses the lowest closed slot.
pub struct Conductor {
    services: Services,
    session: Arc<Session>,
    slots: Vec<Option<Mounted>>,
}

struct Mounted {
    controller: PostStatsController,
    surface: Surface,
}

#[derive(Debug, PartialEq, Eq)]
pub enum Response {
    Lines(Vec<String>),
    Quit,
}

impl Conductor {
    pub fn new(services: Services, session: Arc<Session>) -> Self {
        Self {
            services,
            session,
            slots: vec![],
        }
    }

    pub async fn run<R, W>(&mut self, input: R, mut output: W) -> Result<()>
    where
        R: AsyncBufRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        let mut lines = input.lines();

        while let Some(line) = lines.next_line().await? {
            let res = match parse_line(&line) {
                Ok(None) => continue,
                Ok(Some(cmd)) => self.conduct(cmd).await,
                Err(e) => Err(e),
            };

            let out = match res {
                Ok(Response::Quit) => break,
                Ok(Response::Lines(l)) => l,
                Err(e) => vec![format!("error: {}", e)],
            };

            for l in out {
                output.write_all(l.as_bytes()).await?;
                output.write_all(b"\n").await?;
            }
            output.flush().await?;
        }

        Ok(())
    }

    #[tracing::instrument(skip(self))]
    pub async fn conduct(&mut self, Cmd { cmd }: Cmd) -> Result<Response> {
        let acting = self.session.user_id().clone();

        let lines = match cmd {
            RootMod::Open(OpenCmd { post_id, path }) => {
                let get::Output { post } = self.services.post_get.handle(get::Input { post_id }).await?;
                let surface = Surface::from_path(&path);
                let controller =
                    PostStatsController::mount(&post, self.services.clone(), self.session.clone());

                let view = StatsView::of(&controller, &acting, surface);
                let slot = self.vacant_slot();
                self.slots[slot] = Some(Mounted {
                    controller,
                    surface,
                });

                vec![format!("slot {}: {}", slot, view)]
            },

            RootMod::Like(SlotCmd { slot }) => {
                let m = self.mounted(slot)?;
                m.controller.sync();
                // not awaited
                drop(m.controller.toggle_like(&acting));

                vec![render(slot, m, &acting)]
            },

            RootMod::Save(SlotCmd { slot }) => {
                let m = self.mounted(slot)?;
                // a refetch from another slot may have changed the saved flag
                m.controller.sync();
                drop(m.controller.toggle_save(&acting));

                vec![render(slot, m, &acting)]
            },

            RootMod::Show(ShowCmd { slot: Some(slot) }) => {
                let m = self.mounted(slot)?;
                m.controller.sync();

                vec![render(slot, m, &acting)]
            },

            RootMod::Show(ShowCmd { slot: None }) => self
                .slots
                .iter_mut()
                .enumerate()
                .filter_map(|(i, s)| s.as_mut().map(|m| (i, m)))
                .map(|(i, m)| {
                    m.controller.sync();
                    render(i, m, &acting)
                })
                .collect(),

            RootMod::Close(SlotCmd { slot }) => {
                self.mounted(slot)?;
                self.slots[slot] = None;

                vec![format!("slot {} closed", slot)]
            },

            RootMod::Refresh => match self.session.refresh().await.swallow("refresh") {
                Some(user) => vec![format!(
                    "{} (@{}): {} saved",
                    user.name,
                    user.username,
                    user.saves.len()
                )],
                None => vec!["current user unavailable".to_string()],
            },

            RootMod::Quit => return Ok(Response::Quit),
        };

        Ok(Response::Lines(lines))
    }

    fn vacant_slot(&mut self) -> usize {
        match self.slots.iter().position(Option::is_none) {
            Some(i) => i,
            None => {
                self.slots.push(None);
                self.slots.len() - 1
            },
        }
    }

    fn mounted(&mut self, slot: usize) -> Result<&mut Mounted> {
        self.slots
            .get_mut(slot)
            .and_then(Option::as_mut)
            .ok_or_else(|| anyhow!("no widget in slot {}", slot))
    }
}

fn render(slot: usize, m: &Mounted, viewer: &crate::entities::UserId) -> String {
    format!(
        "slot {}: {}",
        slot,
        StatsView::of(&m.controller, viewer, m.surface)
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constructors::{in_memory, InMemoryBackend};
    use crate::fixtures::Fixture;
    use crate::repositories::SaveRepository;

    const RAW: &str = r#"{
        "users": [{ "id": "u1", "name": "One", "username": "one" }],
        "posts": [
            {
                "id": "p1", "creator": "u2", "caption": "a",
                "image": { "id": "i1", "url": "https://example.invalid/1" },
                "likers": ["u2", "u3"]
            },
            {
                "id": "p2", "creator": "u3", "caption": "b",
                "image": { "id": "i2", "url": "https://example.invalid/2" }
            }
        ],
        "saves": [{ "id": "s1", "user": "u1", "post": "p2" }]
    }"#;

    async fn conductor() -> Conductor { conductor_with_backend().await.0 }

    async fn conductor_with_backend() -> (Conductor, InMemoryBackend) {
        let backend = in_memory();
        backend.load(Fixture::from_json(RAW).unwrap()).await.unwrap();
        let services = backend.services();
        let session = Arc::new(Session::new("u1".into(), services.user_current.clone()));
        session.refresh().await.unwrap();

        (Conductor::new(services, session), backend)
    }

    async fn stored_saves(backend: &InMemoryBackend, post: &str) -> usize {
        backend
            .saves
            .finds_by_user(&"u1".into())
            .await
            .unwrap()
            .iter()
            .filter(|r| r.post.as_str() == post)
            .count()
    }

    fn known_saves(c: &Conductor, post: &str) -> usize {
        c.session
            .current()
            .map(|u| u.saves.iter().filter(|r| r.post.as_str() == post).count())
            .unwrap_or(0)
    }

    async fn run_script(c: &mut Conductor, script: &str) -> String {
        let mut out = vec![];
        c.run(script.as_bytes(), &mut out).await.unwrap();
        String::from_utf8(out).unwrap()
    }

    #[tokio::test]
    async fn scripted_session() {
        let mut c = conductor().await;

        let out = run_script(
            &mut c,
            "open p1\nlike 0\nopen p2 --path /profile/u1\n\nsave 1\nshow 7\nbogus\nclose 0\nshow\nquit\nlike 0\n",
        )
        .await;
        let lines = out.lines().collect::<Vec<_>>();

        assert_eq!(lines[0], "slot 0: [p1] ♡ 2 □ save");
        assert_eq!(lines[1], "slot 0: [p1] ♥ 3 □ save");
        assert!(lines[2].starts_with("slot 1: [p2] ♡ 0"));
        assert!(lines[2].ends_with("■ saved"));
        assert!(lines[3].starts_with("slot 1: [p2] … 0"));
        assert!(lines[3].ends_with("□ save"));
        assert_eq!(lines[4], "error: no widget in slot 7");
        assert!(lines[5].starts_with("error: "));
        assert_eq!(lines[6], "slot 0 closed");
        assert_eq!(lines.len(), 8);
        assert!(lines[7].starts_with("slot 1: [p2]"));
    }

    #[tokio::test]
    async fn closed_slot_is_gone() {
        let mut c = conductor().await;

        let out = run_script(&mut c, "open p1\nclose 0\nlike 0\n").await;

        assert!(out.ends_with("error: no widget in slot 0\n"));
    }

    #[tokio::test]
    async fn unknown_post_is_reported() {
        let mut c = conductor().await;

        let out = run_script(&mut c, "open nope\nrefresh\n").await;
        let lines = out.lines().collect::<Vec<_>>();

        assert_eq!(lines[0], "error: cannot find post.");
        assert_eq!(lines[1], "One (@one): 1 saved");
    }

    #[tokio::test]
    async fn save_on_second_slot_sees_refetched_record() {
        let (mut c, backend) = conductor_with_backend().await;

        run_script(&mut c, "open p1\nopen p1 --path /profile/u1\nsave 0\n").await;
        for _ in 0..100 {
            if known_saves(&c, "p1") == 1 {
                break;
            }
            tokio::task::yield_now().await;
        }
        assert_eq!(known_saves(&c, "p1"), 1);
        assert_eq!(stored_saves(&backend, "p1").await, 1);

        let out = run_script(&mut c, "save 1\n").await;
        assert!(out.starts_with("slot 1: [p1] … 2"));
        assert!(out.trim_end().ends_with("□ save"));

        for _ in 0..100 {
            if stored_saves(&backend, "p1").await == 0 {
                break;
            }
            tokio::task::yield_now().await;
        }
        assert_eq!(stored_saves(&backend, "p1").await, 0);
    }

    #[tokio::test]
    async fn open_reuses_closed_slot() {
        let mut c = conductor().await;

        let out = run_script(&mut c, "open p1\nopen p2\nclose 0\nopen p2\nopen p1\n").await;
        let lines = out.lines().collect::<Vec<_>>();

        assert_eq!(lines[2], "slot 0 closed");
        assert!(lines[3].starts_with("slot 0: [p2]"));
        assert!(lines[4].starts_with("slot 2: [p1]"));
    }
}
