use yew::prelude::*;

use crate::tasks::api::{leaderboard_totals, Task, User};

#[derive(Properties, Clone)]
pub struct LeaderboardProps {
    pub tasks: Vec<Task>,
    pub users: Vec<User>,
}

/// Standings table derived from the per-task score maps.
pub struct Leaderboard {
    props: LeaderboardProps,
}

impl Leaderboard {
    fn avatar_for(&self, name: &str) -> Option<String> {
        self.props
            .users
            .iter()
            .find(|user| user.name == name)
            .and_then(|user| user.avatar.clone())
    }
}

impl Component for Leaderboard {
    type Message = ();
    type Properties = LeaderboardProps;

    fn create(props: Self::Properties, _link: ComponentLink<Self>) -> Self {
        Self { props }
    }

    fn change(&mut self, props: Self::Properties) -> ShouldRender {
        self.props = props;
        true
    }

    fn update(&mut self, _msg: Self::Message) -> ShouldRender {
        false
    }

    fn view(&self) -> Html {
        let totals = leaderboard_totals(&self.props.tasks);

        html! {
            <div class="leaderboard">
                <h2>{ "Leaderboard" }</h2>
                { totals.iter().enumerate().map(|(rank, (name, total))| {
                    html! {
                        <div class="leaderboard-row">
                            <span class="leaderboard-rank">{ rank + 1 }</span>
                            { match self.avatar_for(name) {
                                Some(avatar) => html! { <img class="leaderboard-avatar" src=avatar alt="Avatar" /> },
                                None => html! {},
                            } }
                            <span class="leaderboard-name">{ name }</span>
                            <span class="leaderboard-total">{ format!("{} VP", total) }</span>
                        </div>
                    }
                }).collect::<Html>() }
            </div>
        }
    }
}
