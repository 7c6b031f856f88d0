//! Application state: screens, buttons, and dispatch.
//!
//! Every screen is a prompt text plus a bounded list of labeled buttons,
//! the same surface an inline-keyboard transport would render. Button
//! presses dispatch closed [`Action`] values instead of stringly
//! callback data.

use ethno_core::{
    ActiveGame, Category, ChatId, Engine, EngineError, GameKind, MatchGame, QuizPayload,
    RunProgress, SearchMode, SelectOutcome, SlotKind, TextReply,
};

/// Everything a button press can mean.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    MainMenu,
    GamesMenu,
    SearchMenu,
    Contacts,
    Feedback,
    Quit,

    StartGame(GameKind),
    Answer(usize),
    MatchSelect(SlotKind, usize),

    SelectEntities,
    ToggleEntity(String),
    EntityPage(usize),
    ContinueSelection,
    CategoryOverview,
    CategoryHint(Category),

    OpenEntity(String),
    OpenCategory { entity: String, category: Category },
    ItemPage { entity: String, category: Category, page: usize },
    OpenItem { entity: String, category: Category, index: usize },
    MultiCategory(Category),

    SearchEntities,
    SearchItems,
    SearchScoped { entity: String, category: Category },
}

/// One rendered screen.
#[derive(Debug, Clone)]
pub struct ScreenView {
    pub text: String,
    pub buttons: Vec<(String, Action)>,
}

impl ScreenView {
    fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            buttons: Vec::new(),
        }
    }

    fn button(mut self, label: impl Into<String>, action: Action) -> Self {
        self.buttons.push((label.into(), action));
        self
    }
}

const WELCOME: &str = "🌟 Добро пожаловать в Этносферу!\n\n\
Цифровая платформа народной культуры.\n\n\
📍 Здесь вы найдете:\n\
• Информацию о традициях народов\n\
• Национальную кухню и рецепты\n\
• Традиционные костюмы и орнаменты\n\
• События и праздники\n\
• Увлекательные игры и викторины\n\n\
👇 Выберите действие из меню ниже:";

const CONTACTS: &str = "📞 Контакты\n\n\
🏛 Проект «Этносфера»\n\
📧 Email: ethnosphere@example.org";

pub struct App {
    engine: Engine,
    chat: ChatId,
    /// Last launched game, for the "play again" button.
    last_game: Option<GameKind>,
}

impl App {
    pub fn new(engine: Engine) -> Self {
        Self {
            engine,
            chat: 0,
            last_game: None,
        }
    }

    pub fn engine(&self) -> &Engine {
        &self.engine
    }

    /// Entry screen, also reached by the home button.
    pub fn start(&mut self) -> ScreenView {
        self.dispatch(Action::MainMenu)
    }

    /// Handle one button press.
    pub fn dispatch(&mut self, action: Action) -> ScreenView {
        match action {
            Action::MainMenu => {
                self.engine.reset_session(self.chat);
                main_menu(WELCOME)
            }
            Action::GamesMenu => games_menu(
                "🎮 Игры и викторины\n\nПроверьте свои знания о культуре народов!\n\n👇 Выберите игру:",
            ),
            Action::Contacts => {
                ScreenView::new(CONTACTS).button("🏠 Главное меню", Action::MainMenu)
            }
            Action::Feedback => {
                self.engine.begin_feedback(self.chat);
                ScreenView::new(
                    "💬 Обратная связь\n\nНапишите сообщение — мы обязательно его рассмотрим!",
                )
                .button("🏠 Главное меню", Action::MainMenu)
            }
            Action::Quit => ScreenView::new("До встречи! 👋"),

            Action::StartGame(kind) => self.start_game(kind),
            Action::Answer(option) => self.answer(option),
            Action::MatchSelect(slot, index) => self.match_select(slot, index),

            Action::SelectEntities => {
                self.engine.clear_selection(self.chat);
                self.engine.set_page(self.chat, 0);
                self.entity_select_screen()
            }
            Action::ToggleEntity(entity) => {
                if let Err(e) = self.engine.toggle_entity(self.chat, &entity) {
                    return self.error_screen(e);
                }
                self.entity_select_screen()
            }
            Action::EntityPage(page) => {
                self.engine.set_page(self.chat, page);
                self.entity_select_screen()
            }
            Action::ContinueSelection => self.continue_selection(),
            Action::CategoryOverview => {
                let mut screen = ScreenView::new("📂 Выберите категорию:");
                for category in Category::ALL {
                    screen = screen.button(category.label(), Action::CategoryHint(category));
                }
                screen.button("🏠 Главное меню", Action::MainMenu)
            }
            Action::CategoryHint(category) => ScreenView::new(format!(
                "📋 {}\n\nСначала выберите национальность через главное меню.",
                category.label()
            ))
            .button("🌍 Выбрать национальность", Action::SelectEntities)
            .button("🏠 Главное меню", Action::MainMenu),

            Action::OpenEntity(entity) => self.category_menu(entity),
            Action::OpenCategory { entity, category } => self.item_list(entity, category, 0),
            Action::ItemPage {
                entity,
                category,
                page,
            } => self.item_list(entity, category, page),
            Action::OpenItem {
                entity,
                category,
                index,
            } => self.item_view(entity, category, index),
            Action::MultiCategory(category) => self.multi_category(category),

            Action::SearchMenu => ScreenView::new("🔍 Поиск по названию\n\n👇 Что вы хотите найти?")
                .button("🌍 Искать национальность", Action::SearchEntities)
                .button("📋 Искать элементы", Action::SearchItems)
                .button("🏠 Главное меню", Action::MainMenu),
            Action::SearchEntities => {
                self.engine.begin_search(self.chat, SearchMode::Entities);
                ScreenView::new("🔍 Поиск национальности\n\nВведите название национальности:")
                    .button("❌ Отмена", Action::MainMenu)
            }
            Action::SearchItems => {
                self.engine.begin_search(self.chat, SearchMode::AllItems);
                ScreenView::new(
                    "🔍 Поиск элементов\n\nВведите название (например: щи, кокошник, хоровод):",
                )
                .button("❌ Отмена", Action::MainMenu)
            }
            Action::SearchScoped { entity, category } => {
                self.engine.begin_search(
                    self.chat,
                    SearchMode::Scoped {
                        entity: entity.clone(),
                        category,
                    },
                );
                ScreenView::new("🔍 Поиск\n\nВведите поисковый запрос:")
                    .button("❌ Отмена", Action::OpenCategory { entity, category })
            }
        }
    }

    /// Handle a free-text message (search query or feedback).
    pub fn handle_text(&mut self, text: &str) -> ScreenView {
        match self.engine.handle_text(self.chat, text) {
            TextReply::FeedbackReceived => {
                main_menu("✅ Спасибо за ваш отзыв!\n\nМы его обязательно рассмотрим.")
            }
            TextReply::EntityMatches(hits) => {
                let mut screen =
                    ScreenView::new(format!("🔍 Результаты поиска\n\nНайдено: {}", hits.len()));
                for (id, display) in hits {
                    screen = screen.button(display, Action::OpenEntity(id));
                }
                screen.button("🏠 Главное меню", Action::MainMenu)
            }
            TextReply::ItemMatches(hits) => {
                let mut screen = ScreenView::new(format!(
                    "🔍 Результаты поиска «{text}»\n\nНайдено элементов: {}\n\n👇 Выберите элемент:",
                    hits.len()
                ));
                for entry in hits {
                    let label = format!(
                        "{} - {}",
                        entry.item.name,
                        self.engine.localizer().display(&entry.entity)
                    );
                    screen = screen.button(
                        label,
                        Action::OpenItem {
                            entity: entry.entity,
                            category: entry.category,
                            index: entry.index,
                        },
                    );
                }
                screen
                    .button("🔍 Новый поиск", Action::SearchMenu)
                    .button("🏠 Главное меню", Action::MainMenu)
            }
            TextReply::ScopedMatches {
                entity,
                category,
                hits,
            } => {
                let mut screen =
                    ScreenView::new(format!("🔍 Результаты поиска\n\nНайдено: {}", hits.len()));
                for (index, name) in hits {
                    screen = screen.button(
                        name,
                        Action::OpenItem {
                            entity: entity.clone(),
                            category,
                            index,
                        },
                    );
                }
                screen
                    .button("⬅️ К списку", Action::OpenCategory { entity, category })
                    .button("🏠 Главное меню", Action::MainMenu)
            }
            TextReply::NoMatches => {
                main_menu("❌ Ничего не найдено\n\nПопробуйте другой запрос.")
            }
            TextReply::Unhandled => main_menu("❓ Выберите действие из меню."),
        }
    }

    // ------------------------------------------------------------------
    // Games
    // ------------------------------------------------------------------

    fn start_game(&mut self, kind: GameKind) -> ScreenView {
        self.last_game = Some(kind);
        match self.engine.start_game(self.chat, kind) {
            Ok(ActiveGame::Quiz(payload)) => {
                let header = self.run_header("");
                self.quiz_screen(&payload, &header)
            }
            Ok(ActiveGame::Pairs(game)) => self.pairs_screen(
                &game,
                "🎯 Найди пару\n\nСопоставьте элементы культуры с национальностями!\n\n\
                 1️⃣ Выберите элемент\n2️⃣ Выберите национальность",
            ),
            Err(e) => self.error_screen(e),
        }
    }

    fn answer(&mut self, option: usize) -> ScreenView {
        let outcome = match self.engine.submit_answer(self.chat, option) {
            Ok(outcome) => outcome,
            Err(e) => return self.error_screen(e),
        };
        let verdict = if outcome.correct {
            "✅ Правильно!".to_string()
        } else {
            format!("❌ Неправильно!\n\nПравильный ответ: {}", outcome.correct_label)
        };

        match outcome.progress {
            None => self.replay_screen(&verdict),
            Some(RunProgress::Next { question, .. }) => {
                let header = self.run_header(&format!("{verdict}\n\n"));
                self.quiz_screen(&question, &header)
            }
            Some(RunProgress::Complete(summary)) => {
                let mut text = format!(
                    "{}\n\nИгра завершена!\n\n📊 Ваш результат: {}/{} очков\n✅ Правильных ответов: {}/{}",
                    summary.kind.title(),
                    summary.score,
                    summary.max_score,
                    summary.correct_answers,
                    summary.total_questions,
                );
                if let Some(grade) = summary.grade {
                    text = format!("{text}\n\n{}", grade.label());
                }
                self.replay_screen(&text)
            }
        }
    }

    fn match_select(&mut self, slot: SlotKind, index: usize) -> ScreenView {
        let outcome = match self.engine.select_match_slot(self.chat, slot, index) {
            Ok(outcome) => outcome,
            Err(e) => return self.error_screen(e),
        };
        let status = match outcome.outcome {
            SelectOutcome::ItemPicked => "Элемент выбран! Теперь выберите национальность.",
            SelectOutcome::Matched => "✅ Правильно!",
            SelectOutcome::Mismatched => "❌ Неправильно! Попробуйте снова.",
            SelectOutcome::NoPending => "⚠️ Сначала выберите элемент!",
            SelectOutcome::Complete => {
                return self.replay_screen(
                    "🎉 Поздравляем!\n\nВы нашли все пары! 🎯\n\nОтличное знание культур народов! ⭐",
                );
            }
        };
        match self.engine.active_game(self.chat) {
            Some(ActiveGame::Pairs(game)) => {
                let text = format!("🎯 Найди пару\n\n{status}");
                self.pairs_screen(&game, &text)
            }
            _ => self.error_screen(EngineError::NotFound),
        }
    }

    fn quiz_screen(&self, payload: &QuizPayload, header: &str) -> ScreenView {
        let mut text = format!("{header}{}", payload.prompt(self.engine.localizer()));
        if let Some((entity, category, image)) = payload.photo() {
            let path = self.engine.catalog().image_path(entity, category, image);
            text.push_str(&format!("\n🖼 {}", path.display()));
        }
        let mut screen = ScreenView::new(text);
        for (index, label) in payload.option_labels(self.engine.localizer()).into_iter().enumerate()
        {
            screen = screen.button(label, Action::Answer(index));
        }
        screen.button("❌ Выход", Action::GamesMenu)
    }

    fn pairs_screen(&self, game: &MatchGame, text: &str) -> ScreenView {
        let mut screen = ScreenView::new(format!(
            "{text}\n\n✅ Найдено пар: {}/4",
            game.matches_found()
        ));
        for (index, name) in game.item_slots() {
            let marker = if game.pending() == Some(index) { "🔸" } else { "◦" };
            screen = screen.button(
                format!("{marker} {name}"),
                Action::MatchSelect(SlotKind::Item, index),
            );
        }
        for (index, display) in game.entity_slots(self.engine.localizer()) {
            screen = screen.button(
                format!("➜ {display}"),
                Action::MatchSelect(SlotKind::Entity, index),
            );
        }
        screen.button("🏠 Главное меню", Action::MainMenu)
    }

    /// "Question N/M, score S" header when a run is active.
    fn run_header(&self, prefix: &str) -> String {
        match self.engine.run_status(self.chat) {
            Some(run) => format!(
                "{prefix}{}\n\n📊 Вопрос {}/{}\n⭐ Очки: {}\n\n",
                run.kind().title(),
                run.question_number(),
                run.kind().total_questions(),
                run.score()
            ),
            None => prefix.to_string(),
        }
    }

    fn replay_screen(&self, text: &str) -> ScreenView {
        let mut screen = ScreenView::new(text);
        if let Some(kind) = self.last_game {
            screen = screen.button("🔄 Играть снова", Action::StartGame(kind));
        }
        screen
            .button("🎮 Другие игры", Action::GamesMenu)
            .button("🏠 Главное меню", Action::MainMenu)
    }

    fn error_screen(&self, error: EngineError) -> ScreenView {
        let text = match error {
            EngineError::InsufficientData => "❌ Недостаточно данных для игры",
            EngineError::NotFound => "❌ Элемент не найден",
        };
        games_menu(text)
    }

    // ------------------------------------------------------------------
    // Navigation
    // ------------------------------------------------------------------

    fn entity_select_screen(&self) -> ScreenView {
        let page_no = self.engine.page(self.chat);
        let page = self.engine.entity_page(page_no);
        let selected = self.engine.selected_entities(self.chat);

        let mut screen = ScreenView::new(
            "🌍 Выберите национальность:\n\nНажмите на название для выбора, затем «Далее»",
        );
        for (id, display) in page.items {
            let label = if selected.contains(&id) {
                format!("◦ {display} ◦")
            } else {
                display
            };
            screen = screen.button(label, Action::ToggleEntity(id));
        }
        if page.has_prev {
            screen = screen.button("◀️", Action::EntityPage(page_no - 1));
        }
        if !selected.is_empty() {
            screen = screen.button("Далее", Action::ContinueSelection);
        } else if page.has_next {
            screen = screen.button("Далее", Action::EntityPage(page_no + 1));
        } else {
            screen = screen.button("Далее", Action::EntityPage(0));
        }
        if page.has_next {
            screen = screen.button("▶️", Action::EntityPage(page_no + 1));
        }
        screen
            .button("🔍 Поиск по названию", Action::SearchEntities)
            .button("Отмена", Action::MainMenu)
    }

    fn continue_selection(&mut self) -> ScreenView {
        let selected = self.engine.selected_entities(self.chat);
        match selected.as_slice() {
            [] => {
                let mut screen = self.entity_select_screen();
                screen.text = format!(
                    "⚠️ Выберите хотя бы одну национальность\n\n{}",
                    screen.text
                );
                screen
            }
            [entity] => self.category_menu(entity.clone()),
            _ => {
                let mut screen = ScreenView::new(format!(
                    "📋 Выбрано национальностей: {}\n\n👇 Выберите категорию:",
                    selected.len()
                ));
                for category in Category::ALL {
                    screen = screen.button(category.label(), Action::MultiCategory(category));
                }
                screen
                    .button("⬅️ К национальностям", Action::SelectEntities)
                    .button("🏠 Главное меню", Action::MainMenu)
            }
        }
    }

    fn category_menu(&self, entity: String) -> ScreenView {
        let display = self.engine.localizer().display(&entity);
        let mut screen = ScreenView::new(format!(
            "📋 {display}\n\n👇 Выберите категорию для просмотра:"
        ));
        for category in Category::ALL {
            screen = screen.button(
                category.label(),
                Action::OpenCategory {
                    entity: entity.clone(),
                    category,
                },
            );
        }
        screen
            .button("⬅️ К национальностям", Action::SelectEntities)
            .button("🏠 Главное меню", Action::MainMenu)
    }

    fn item_list(&self, entity: String, category: Category, page_no: usize) -> ScreenView {
        let display = self.engine.localizer().display(&entity);
        let page = self.engine.item_page(&entity, category, page_no);

        if page.total == 0 {
            return ScreenView::new(format!(
                "📂 {display} - {}\n\n❌ Список пуст. Данные еще не добавлены.",
                category.label()
            ))
            .button("⬅️ К категориям", Action::OpenEntity(entity))
            .button("🏠 Главное меню", Action::MainMenu);
        }

        let mut screen = ScreenView::new(format!(
            "📂 {display} - {}\n\n👇 Выберите элемент из списка:",
            category.label()
        ));
        for (index, item) in page.items {
            screen = screen.button(
                item.name,
                Action::OpenItem {
                    entity: entity.clone(),
                    category,
                    index,
                },
            );
        }
        if page.has_prev {
            screen = screen.button(
                "◀️",
                Action::ItemPage {
                    entity: entity.clone(),
                    category,
                    page: page_no - 1,
                },
            );
        }
        let next_page = if page.has_next { page_no + 1 } else { 0 };
        screen = screen.button(
            "Далее",
            Action::ItemPage {
                entity: entity.clone(),
                category,
                page: next_page,
            },
        );
        screen
            .button(
                "🔍 Поиск",
                Action::SearchScoped {
                    entity: entity.clone(),
                    category,
                },
            )
            .button("⬅️ К категориям", Action::OpenEntity(entity))
            .button("🏠 Главное меню", Action::MainMenu)
    }

    fn item_view(&self, entity: String, category: Category, index: usize) -> ScreenView {
        let item = match self.engine.item(&entity, category, index) {
            Ok(item) => item,
            Err(e) => return self.error_screen(e),
        };
        let display = self.engine.localizer().display(&entity);
        let image = self
            .engine
            .catalog()
            .image_path(&entity, category, &item.image);
        ScreenView::new(format!(
            "📌 {}\n🌍 {display}\n📂 {}\n📅 {}\n🖼 {}\n\n{}",
            item.name,
            category.label(),
            item.date,
            image.display(),
            item.description
        ))
        .button("⬅️ Назад к списку", Action::OpenCategory { entity, category })
        .button("🏠 Главное меню", Action::MainMenu)
    }

    fn multi_category(&self, category: Category) -> ScreenView {
        let items = self.engine.multi_category_items(self.chat, category);
        if items.is_empty() {
            return ScreenView::new(format!(
                "📋 {}\n\n❌ Список пуст. Данные еще не добавлены.",
                category.label()
            ))
            .button("⬅️ Назад", Action::ContinueSelection)
            .button("🏠 Главное меню", Action::MainMenu);
        }

        let mut screen = ScreenView::new(format!(
            "📋 {}\nНайдено: {}\n\n👇 Выберите элемент:",
            category.label(),
            items.len()
        ));
        for entry in items {
            let label = format!(
                "{} - {}",
                entry.item.name,
                self.engine.localizer().display(&entry.entity)
            );
            screen = screen.button(
                label,
                Action::OpenItem {
                    entity: entry.entity,
                    category,
                    index: entry.index,
                },
            );
        }
        screen
            .button("⬅️ Назад", Action::ContinueSelection)
            .button("🏠 Главное меню", Action::MainMenu)
    }
}

fn main_menu(text: &str) -> ScreenView {
    ScreenView::new(text)
        .button("🎮 Игры", Action::GamesMenu)
        .button("🔍 Поиск по названию", Action::SearchMenu)
        .button("🌍 Выбрать национальность", Action::SelectEntities)
        .button("📂 Выбрать категорию", Action::CategoryOverview)
        .button("📞 Контакты", Action::Contacts)
        .button("💬 Обратная связь", Action::Feedback)
        .button("🚪 Выход", Action::Quit)
}

fn games_menu(text: &str) -> ScreenView {
    ScreenView::new(text)
        .button("🌍 Угадай национальность", Action::StartGame(GameKind::EntityQuiz))
        .button("🍲 Угадай блюдо", Action::StartGame(GameKind::DishQuiz))
        .button("🏆 Культурный марафон", Action::StartGame(GameKind::Marathon))
        .button("🎯 Найди пару", Action::StartGame(GameKind::MatchPairs))
        .button("⚡ Блиц-викторина", Action::StartGame(GameKind::Blitz))
        .button("🏠 Главное меню", Action::MainMenu)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ethno_core::{Catalog, Localizer};
    use std::fs;
    use tempfile::TempDir;

    fn record(name: &str) -> String {
        format!(
            "=START= {{{name} / {name}.png / 1800}} ===\nОписание.\n=END= {{{name}}} ===\n"
        )
    }

    fn app_with_store() -> (TempDir, App) {
        let tmp = TempDir::new().expect("temp dir");
        for entity in ["even", "evenk", "russian", "sakha"] {
            let dir = tmp.path().join(entity).join(Category::Cuisine.dir_name());
            fs::create_dir_all(&dir).expect("category dir");
            fs::write(dir.join("list.txt"), record(&format!("Блюдо-{entity}")))
                .expect("list file");
        }
        let mut localizer = Localizer::new();
        localizer.insert("russian", "Русские");
        let catalog = Catalog::new(tmp.path());
        let app = App::new(Engine::from_parts(catalog, localizer));
        (tmp, app)
    }

    #[test]
    fn test_main_menu_has_all_sections() {
        let (_tmp, mut app) = app_with_store();
        let screen = app.start();
        assert_eq!(screen.buttons.len(), 7);
        assert!(screen.buttons.iter().any(|(_, a)| *a == Action::GamesMenu));
    }

    #[test]
    fn test_quiz_screen_offers_answer_buttons() {
        let (_tmp, mut app) = app_with_store();
        let screen = app.dispatch(Action::StartGame(GameKind::EntityQuiz));
        let answers = screen
            .buttons
            .iter()
            .filter(|(_, a)| matches!(a, Action::Answer(_)))
            .count();
        assert_eq!(answers, 4);
    }

    #[test]
    fn test_marathon_runs_to_completion() {
        let (_tmp, mut app) = app_with_store();
        let mut screen = app.dispatch(Action::StartGame(GameKind::Marathon));
        for _ in 0..10 {
            let (_, action) = screen
                .buttons
                .iter()
                .find(|(_, a)| matches!(a, Action::Answer(_)))
                .expect("answer button")
                .clone();
            screen = app.dispatch(action);
        }
        assert!(screen.text.contains("Игра завершена"));
        assert!(app.engine().run_status(0).is_none());
    }

    #[test]
    fn test_entity_select_lists_catalog_entities() {
        let (_tmp, mut app) = app_with_store();
        let screen = app.dispatch(Action::SelectEntities);
        let toggles = screen
            .buttons
            .iter()
            .filter(|(_, a)| matches!(a, Action::ToggleEntity(_)))
            .count();
        assert_eq!(toggles, 4);
    }

    #[test]
    fn test_item_search_round_trip() {
        let (_tmp, mut app) = app_with_store();
        app.dispatch(Action::SearchItems);
        let screen = app.handle_text("блюдо");
        assert!(screen
            .buttons
            .iter()
            .any(|(_, a)| matches!(a, Action::OpenItem { .. })));
    }
}
