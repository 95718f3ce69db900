//! Localised static content for the terminal views and the search index

use shared::{Language, PaidPlan, Theme};

/// Top-level destinations reachable from the navigation bar
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Section {
    Home,
    Generator,
    Gallery,
    Examples,
    Prompts,
    Faq,
    Pricing,
    Support,
    Profile,
    Admin,
}

impl Section {
    /// Navigation order. Admin is last and only shown to admins.
    pub const ALL: [Section; 10] = [
        Section::Home,
        Section::Generator,
        Section::Gallery,
        Section::Examples,
        Section::Prompts,
        Section::Faq,
        Section::Pricing,
        Section::Support,
        Section::Profile,
        Section::Admin,
    ];
}

pub struct Nav {
    pub home: &'static str,
    pub generator: &'static str,
    pub gallery: &'static str,
    pub examples: &'static str,
    pub prompts: &'static str,
    pub faq: &'static str,
    pub pricing: &'static str,
    pub support: &'static str,
    pub profile: &'static str,
    pub admin: &'static str,
}

/// Synonyms matched by search, one list per section
pub struct NavKeywords {
    pub home: &'static [&'static str],
    pub generator: &'static [&'static str],
    pub gallery: &'static [&'static str],
    pub examples: &'static [&'static str],
    pub prompts: &'static [&'static str],
    pub faq: &'static [&'static str],
    pub pricing: &'static [&'static str],
    pub support: &'static [&'static str],
    pub profile: &'static [&'static str],
    pub admin: &'static [&'static str],
}

pub struct Hero {
    pub title: &'static str,
    pub subtitle: &'static str,
    pub cta: &'static str,
}

pub struct Feature {
    pub title: &'static str,
    pub description: &'static str,
}

pub struct ThemeNames {
    pub professional: &'static str,
    pub fashion: &'static str,
    pub casual: &'static str,
    pub outdoor: &'static str,
    pub vintage: &'static str,
    pub studio: &'static str,
}

pub struct GeneratorCopy {
    pub title: &'static str,
    pub prompt: &'static str,
    pub choose_theme: &'static str,
    pub size: &'static str,
    pub model: &'static str,
    pub generate_btn: &'static str,
    pub generating: &'static str,
    pub fallback_prompt_note: &'static str,
    pub free_left: &'static str,
    pub credits_left: &'static str,
}

pub struct GalleryCopy {
    pub title: &'static str,
    pub empty: &'static str,
    pub not_saved: &'static str,
    pub loading: &'static str,
}

pub struct FaqItem {
    pub q: &'static str,
    pub a: &'static str,
}

pub struct PromptCategory {
    pub title: &'static str,
    pub prompts: &'static [&'static str],
}

pub struct PromptsCopy {
    pub title: &'static str,
    pub subtitle: &'static str,
    pub categories: &'static [PromptCategory],
    pub tip: &'static str,
}

pub struct PricingCopy {
    pub title: &'static str,
    pub starter: &'static str,
    pub standard: &'static str,
    pub premium: &'static str,
    pub credits: &'static str,
    pub buy_hint: &'static str,
    pub promo_hint: &'static str,
}

pub struct ProfileCopy {
    pub title: &'static str,
    pub generated: &'static str,
    pub credits_left: &'static str,
    pub free_left: &'static str,
    pub plan: &'static str,
    pub signed_out: &'static str,
}

pub struct SupportCopy {
    pub title: &'static str,
    pub body: &'static str,
    pub contact: &'static str,
}

/// Notification titles, one per error category
pub struct ErrorTitles {
    pub validation: &'static str,
    pub auth: &'static str,
    pub quota: &'static str,
    pub rejected: &'static str,
    pub transport: &'static str,
    pub server: &'static str,
    pub local: &'static str,
}

pub struct Notices {
    pub generated: &'static str,
    pub not_saved: &'static str,
    pub signed_in: &'static str,
    pub signed_out: &'static str,
    pub registered: &'static str,
    pub reset_sent: &'static str,
    pub reset_done: &'static str,
    pub promo_redeemed: &'static str,
    pub promo_created: &'static str,
    pub order_created: &'static str,
}

pub struct SearchCopy {
    pub placeholder: &'static str,
    pub section: &'static str,
    pub theme: &'static str,
}

pub struct FormCopy {
    pub email: &'static str,
    pub password: &'static str,
    pub confirm_password: &'static str,
    pub username: &'static str,
    pub full_name: &'static str,
    pub accept_terms: &'static str,
    pub reset_token: &'static str,
    pub promo_code: &'static str,
    pub generations: &'static str,
    pub max_uses: &'static str,
    pub sign_in: &'static str,
    pub register: &'static str,
    pub reset_password: &'static str,
    pub working: &'static str,
}

pub struct AdminCopy {
    pub overview: &'static str,
    pub users: &'static str,
    pub images: &'static str,
    pub promos: &'static str,
    pub total_users: &'static str,
    pub total_images: &'static str,
    pub credits_used: &'static str,
    pub active_users: &'static str,
    pub active: &'static str,
    pub inactive: &'static str,
    pub loading: &'static str,
}

/// Key hints shown in the footer
pub struct Hints {
    pub global: &'static str,
    pub home: &'static str,
    pub generator: &'static str,
    pub gallery: &'static str,
    pub list: &'static str,
    pub profile_signed_in: &'static str,
    pub profile_signed_out: &'static str,
    pub admin: &'static str,
    pub login: &'static str,
    pub form: &'static str,
    pub search: &'static str,
}

pub struct Strings {
    pub nav: Nav,
    pub keywords: NavKeywords,
    pub hero: Hero,
    pub features: [Feature; 3],
    pub themes: ThemeNames,
    pub theme_keywords: &'static [(Theme, &'static [&'static str])],
    pub generator: GeneratorCopy,
    pub gallery: GalleryCopy,
    pub examples_title: &'static str,
    pub examples_description: &'static str,
    pub faq_title: &'static str,
    pub faq: &'static [FaqItem],
    pub prompts: PromptsCopy,
    pub pricing: PricingCopy,
    pub profile: ProfileCopy,
    pub support: SupportCopy,
    pub errors: ErrorTitles,
    pub notices: Notices,
    pub search: SearchCopy,
    pub forms: FormCopy,
    pub admin: AdminCopy,
    pub hints: Hints,
    /// Share message; `{prompt}` is replaced with the image prompt
    pub share_text: &'static str,
}

impl Strings {
    pub fn section(&self, section: Section) -> &'static str {
        match section {
            Section::Home => self.nav.home,
            Section::Generator => self.nav.generator,
            Section::Gallery => self.nav.gallery,
            Section::Examples => self.nav.examples,
            Section::Prompts => self.nav.prompts,
            Section::Faq => self.nav.faq,
            Section::Pricing => self.nav.pricing,
            Section::Support => self.nav.support,
            Section::Profile => self.nav.profile,
            Section::Admin => self.nav.admin,
        }
    }

    pub fn section_keywords(&self, section: Section) -> &'static [&'static str] {
        match section {
            Section::Home => self.keywords.home,
            Section::Generator => self.keywords.generator,
            Section::Gallery => self.keywords.gallery,
            Section::Examples => self.keywords.examples,
            Section::Prompts => self.keywords.prompts,
            Section::Faq => self.keywords.faq,
            Section::Pricing => self.keywords.pricing,
            Section::Support => self.keywords.support,
            Section::Profile => self.keywords.profile,
            Section::Admin => self.keywords.admin,
        }
    }

    pub fn theme(&self, theme: Theme) -> &'static str {
        match theme {
            Theme::Professional => self.themes.professional,
            Theme::Fashion => self.themes.fashion,
            Theme::Casual => self.themes.casual,
            Theme::Outdoor => self.themes.outdoor,
            Theme::Vintage => self.themes.vintage,
            Theme::Studio => self.themes.studio,
        }
    }

    pub fn theme_keywords(&self, theme: Theme) -> &'static [&'static str] {
        self.theme_keywords
            .iter()
            .find(|(t, _)| *t == theme)
            .map(|(_, k)| *k)
            .unwrap_or(&[])
    }

    pub fn plan(&self, plan: PaidPlan) -> &'static str {
        match plan {
            PaidPlan::Starter => self.pricing.starter,
            PaidPlan::Standard => self.pricing.standard,
            PaidPlan::Premium => self.pricing.premium,
        }
    }

    pub fn share_text(&self, prompt: &str) -> String {
        self.share_text.replace("{prompt}", prompt)
    }
}

pub fn strings(lang: Language) -> &'static Strings {
    match lang {
        Language::En => &EN,
        Language::Ru => &RU,
    }
}

static EN: Strings = Strings {
    nav: Nav {
        home: "Home",
        generator: "Generator",
        gallery: "Gallery",
        examples: "Examples",
        prompts: "Prompts",
        faq: "FAQ",
        pricing: "Pricing",
        support: "Support",
        profile: "Profile",
        admin: "Admin",
    },
    keywords: NavKeywords {
        home: &["main", "start", "welcome"],
        generator: &["create", "generate", "photo", "make", "new image"],
        gallery: &["my images", "history", "saved", "photos"],
        examples: &["samples", "showcase", "inspiration"],
        prompts: &["ideas", "descriptions", "text"],
        faq: &["questions", "help", "how"],
        pricing: &["plans", "price", "buy", "credits", "subscription", "upgrade"],
        support: &["contact", "help", "email"],
        profile: &["account", "me", "settings", "balance"],
        admin: &["dashboard", "users", "promo", "stats"],
    },
    hero: Hero {
        title: "Create Perfect Photoshoots with AI",
        subtitle: "Professional portraits and themed photoshoots with seamless face swap technology",
        cta: "Start Creating",
    },
    features: [
        Feature {
            title: "AI Face Swap",
            description: "Seamless face replacement without imperfections",
        },
        Feature {
            title: "Multiple Themes",
            description: "Professional, fashion, casual, outdoor and more",
        },
        Feature {
            title: "Fast Generation",
            description: "Get your photos in seconds, not hours",
        },
    ],
    themes: ThemeNames {
        professional: "Professional",
        fashion: "Fashion",
        casual: "Casual",
        outdoor: "Outdoor",
        vintage: "Vintage",
        studio: "Studio",
    },
    theme_keywords: &[
        (Theme::Professional, &["business", "corporate", "office", "linkedin"]),
        (Theme::Fashion, &["vogue", "style", "editorial", "model"]),
        (Theme::Casual, &["everyday", "relaxed", "lifestyle"]),
        (Theme::Outdoor, &["street", "nature", "park", "sunset"]),
        (Theme::Vintage, &["retro", "70s", "film", "old"]),
        (Theme::Studio, &["backdrop", "lighting", "portrait"]),
    ],
    generator: GeneratorCopy {
        title: "Photo Generator",
        prompt: "Prompt",
        choose_theme: "Choose Theme",
        size: "Size",
        model: "Model",
        generate_btn: "Generate Photo",
        generating: "Generating...",
        fallback_prompt_note: "No prompt given, using the theme's default description",
        free_left: "Free generations left",
        credits_left: "Credits left",
    },
    gallery: GalleryCopy {
        title: "My Gallery",
        empty: "No images yet. Generate your first photo!",
        not_saved: "not saved",
        loading: "Loading...",
    },
    examples_title: "Examples",
    examples_description: "Professional AI-generated photoshoot",
    faq_title: "FAQ",
    faq: &[
        FaqItem {
            q: "How does AI face swap work?",
            a: "Our AI analyzes facial features and seamlessly blends your face into themed photoshoots.",
        },
        FaqItem {
            q: "What photo quality do I need?",
            a: "We recommend clear, well-lit photos in JPG or PNG format up to 10MB.",
        },
        FaqItem {
            q: "How long does generation take?",
            a: "Most photos are ready in 10-30 seconds depending on complexity.",
        },
        FaqItem {
            q: "How do free generations work?",
            a: "Every new account gets 3 free generations. After that, buy credits or redeem a promo code.",
        },
    ],
    prompts: PromptsCopy {
        title: "Generation Prompts",
        subtitle: "Examples of effective prompts for creating perfect photoshoots",
        categories: &[
            PromptCategory {
                title: "Professional Portraits",
                prompts: &[
                    "Business portrait in suit, neutral background, soft light",
                    "Corporate photo in office, professional attire",
                    "LinkedIn profile, confident look, premium background",
                ],
            },
            PromptCategory {
                title: "Fashion Photoshoots",
                prompts: &[
                    "Fashion portrait in Vogue style, dramatic lighting",
                    "Street fashion, urban background, modern style",
                    "Editorial portrait, high-fashion look",
                ],
            },
            PromptCategory {
                title: "Creative Scenes",
                prompts: &[
                    "70s vintage portrait, warm tones, retro filter",
                    "Studio portrait with colored background, artistic lighting",
                    "Nature portrait at sunset, golden hour",
                ],
            },
        ],
        tip: "Tip: The more detailed the description, the better the result",
    },
    pricing: PricingCopy {
        title: "Pricing",
        starter: "Starter",
        standard: "Standard",
        premium: "Premium",
        credits: "generation credits",
        buy_hint: "Press 1-3 to buy a plan",
        promo_hint: "Press p to redeem a promo code",
    },
    profile: ProfileCopy {
        title: "Profile",
        generated: "Generated",
        credits_left: "Credits Left",
        free_left: "Free Generations Left",
        plan: "Plan",
        signed_out: "You are not signed in",
    },
    support: SupportCopy {
        title: "Support",
        body: "Questions about your account, payments or generated photos? Write to us and we will get back within one business day.",
        contact: "support@photoset.ai",
    },
    errors: ErrorTitles {
        validation: "Check your input",
        auth: "Authentication error",
        quota: "Limit reached",
        rejected: "Request rejected",
        transport: "Connection error",
        server: "Server error",
        local: "Local error",
    },
    notices: Notices {
        generated: "Image generated",
        not_saved: "Image was not saved to your gallery",
        signed_in: "Signed in",
        signed_out: "Signed out",
        registered: "Account created",
        reset_sent: "Password reset requested",
        reset_done: "Password updated",
        promo_redeemed: "Promo code applied",
        promo_created: "Promo code created",
        order_created: "Order created",
    },
    search: SearchCopy {
        placeholder: "Search sections and themes",
        section: "Section",
        theme: "Theme",
    },
    forms: FormCopy {
        email: "Email",
        password: "Password",
        confirm_password: "Confirm password",
        username: "Username",
        full_name: "Full name (optional)",
        accept_terms: "I accept the terms of use",
        reset_token: "Reset token",
        promo_code: "Promo code",
        generations: "Generations",
        max_uses: "Max uses (empty for unlimited)",
        sign_in: "Sign In",
        register: "Create Account",
        reset_password: "Reset Password",
        working: "Please wait...",
    },
    admin: AdminCopy {
        overview: "Overview",
        users: "Users",
        images: "Images",
        promos: "Promo codes",
        total_users: "Total users",
        total_images: "Total images",
        credits_used: "Credits used",
        active_users: "Active this week",
        active: "active",
        inactive: "inactive",
        loading: "Loading...",
    },
    hints: Hints {
        global: "Tab sections  / search  Ctrl+L language  Ctrl+C quit",
        home: "Enter start creating",
        generator: "Up/Down field  Left/Right change  Enter generate",
        gallery: "Up/Down select  f favourite  s share  r reload",
        list: "Up/Down select  Enter use",
        profile_signed_in: "o sign out",
        profile_signed_out: "l sign in  r register",
        admin: "Left/Right tab  r refresh  n new promo  t toggle",
        login: "Enter next/submit  Ctrl+R register  Ctrl+P forgot password",
        form: "Up/Down field  Space toggle  Enter next/submit  Esc back",
        search: "Type to search  Up/Down select  Enter open  Esc close",
    },
    share_text: "Created with PhotoSet AI: {prompt}",
};

static RU: Strings = Strings {
    nav: Nav {
        home: "Главная",
        generator: "Генератор",
        gallery: "Галерея",
        examples: "Примеры",
        prompts: "Промты",
        faq: "FAQ",
        pricing: "Тарифы",
        support: "Поддержка",
        profile: "Профиль",
        admin: "Админ",
    },
    keywords: NavKeywords {
        home: &["главная", "старт", "начало"],
        generator: &["создать", "генерация", "фото", "сделать"],
        gallery: &["мои фото", "история", "сохраненные"],
        examples: &["образцы", "вдохновение"],
        prompts: &["идеи", "описания", "текст"],
        faq: &["вопросы", "помощь", "как"],
        pricing: &["цены", "купить", "кредиты", "подписка", "тариф"],
        support: &["контакты", "помощь", "почта"],
        profile: &["аккаунт", "кабинет", "настройки", "баланс"],
        admin: &["панель", "пользователи", "промокод", "статистика"],
    },
    hero: Hero {
        title: "Создай ФотоСет с ИИ",
        subtitle: "Профессиональные портреты и тематические фотосессии с технологией замены лица",
        cta: "Начать создание",
    },
    features: [
        Feature {
            title: "ИИ замена лица",
            description: "Безупречная замена лица без изъянов",
        },
        Feature {
            title: "Множество тем",
            description: "Профессиональные, модные, повседневные, уличные и другие",
        },
        Feature {
            title: "Быстрая генерация",
            description: "Получите фото за секунды, а не часы",
        },
    ],
    themes: ThemeNames {
        professional: "Профессиональные",
        fashion: "Модные",
        casual: "Повседневные",
        outdoor: "Уличные",
        vintage: "Винтажные",
        studio: "Студийные",
    },
    theme_keywords: &[
        (Theme::Professional, &["деловой", "бизнес", "офис", "linkedin"]),
        (Theme::Fashion, &["мода", "стиль", "vogue"]),
        (Theme::Casual, &["повседневный", "лайфстайл"]),
        (Theme::Outdoor, &["улица", "природа", "закат"]),
        (Theme::Vintage, &["ретро", "70-х", "пленка"]),
        (Theme::Studio, &["студия", "свет", "портрет"]),
    ],
    generator: GeneratorCopy {
        title: "Генератор фото",
        prompt: "Промт",
        choose_theme: "Выберите тему",
        size: "Размер",
        model: "Модель",
        generate_btn: "Сгенерировать фото",
        generating: "Генерация...",
        fallback_prompt_note: "Промт не указан, используется описание темы",
        free_left: "Осталось бесплатных генераций",
        credits_left: "Осталось кредитов",
    },
    gallery: GalleryCopy {
        title: "Моя галерея",
        empty: "Пока нет изображений. Создайте первое фото!",
        not_saved: "не сохранено",
        loading: "Загрузка...",
    },
    examples_title: "Примеры",
    examples_description: "Профессиональная фотосессия, созданная ИИ",
    faq_title: "Часто задаваемые вопросы",
    faq: &[
        FaqItem {
            q: "Как работает замена лица с помощью ИИ?",
            a: "Наш ИИ анализирует черты лица и органично вставляет ваше лицо в тематические фотосессии.",
        },
        FaqItem {
            q: "Какое качество фото мне нужно?",
            a: "Мы рекомендуем четкие, хорошо освещенные фото в формате JPG или PNG до 10MB.",
        },
        FaqItem {
            q: "Сколько времени занимает генерация?",
            a: "Большинство фото готовы за 10-30 секунд в зависимости от сложности.",
        },
        FaqItem {
            q: "Как работают бесплатные генерации?",
            a: "Каждый новый аккаунт получает 3 бесплатные генерации. Затем купите кредиты или активируйте промокод.",
        },
    ],
    prompts: PromptsCopy {
        title: "Промты для генерации",
        subtitle: "Примеры эффективных промтов для создания идеальных фотосессий",
        categories: &[
            PromptCategory {
                title: "Профессиональные портреты",
                prompts: &[
                    "Деловой портрет в костюме, нейтральный фон, мягкий свет",
                    "Корпоративное фото в офисе, профессиональная одежда",
                    "LinkedIn профиль, уверенный взгляд, премиальный фон",
                ],
            },
            PromptCategory {
                title: "Модные фотосессии",
                prompts: &[
                    "Модный портрет в стиле Vogue, драматическое освещение",
                    "Уличная мода, городской фон, современный стиль",
                    "Эдиториальный портрет, хай-фэшн образ",
                ],
            },
            PromptCategory {
                title: "Креативные сюжеты",
                prompts: &[
                    "Винтажный портрет 70-х, теплые тона, ретро фильтр",
                    "Студийный портрет с цветным фоном, художественное освещение",
                    "Природный портрет на закате, золотой час",
                ],
            },
        ],
        tip: "Совет: Чем более детально описание, тем лучше результат",
    },
    pricing: PricingCopy {
        title: "Тарифы",
        starter: "Начальный",
        standard: "Стандарт",
        premium: "Премиум",
        credits: "кредитов для генерации",
        buy_hint: "Нажмите 1-3, чтобы купить тариф",
        promo_hint: "Нажмите p, чтобы активировать промокод",
    },
    profile: ProfileCopy {
        title: "Профиль",
        generated: "Создано",
        credits_left: "Осталось кредитов",
        free_left: "Осталось бесплатных генераций",
        plan: "Тариф",
        signed_out: "Вы не вошли в аккаунт",
    },
    support: SupportCopy {
        title: "Поддержка",
        body: "Вопросы об аккаунте, оплате или созданных фото? Напишите нам, и мы ответим в течение рабочего дня.",
        contact: "support@photoset.ai",
    },
    errors: ErrorTitles {
        validation: "Проверьте данные",
        auth: "Ошибка авторизации",
        quota: "Лимит исчерпан",
        rejected: "Запрос отклонен",
        transport: "Ошибка соединения",
        server: "Ошибка сервера",
        local: "Локальная ошибка",
    },
    notices: Notices {
        generated: "Изображение создано",
        not_saved: "Изображение не сохранено в галерею",
        signed_in: "Вход выполнен",
        signed_out: "Вы вышли из аккаунта",
        registered: "Аккаунт создан",
        reset_sent: "Запрос на сброс пароля отправлен",
        reset_done: "Пароль обновлен",
        promo_redeemed: "Промокод активирован",
        promo_created: "Промокод создан",
        order_created: "Заказ создан",
    },
    search: SearchCopy {
        placeholder: "Поиск разделов и тем",
        section: "Раздел",
        theme: "Тема",
    },
    forms: FormCopy {
        email: "Email",
        password: "Пароль",
        confirm_password: "Повторите пароль",
        username: "Имя пользователя",
        full_name: "Полное имя (необязательно)",
        accept_terms: "Я принимаю условия использования",
        reset_token: "Код сброса",
        promo_code: "Промокод",
        generations: "Генерации",
        max_uses: "Макс. использований (пусто без лимита)",
        sign_in: "Войти",
        register: "Создать аккаунт",
        reset_password: "Сброс пароля",
        working: "Подождите...",
    },
    admin: AdminCopy {
        overview: "Обзор",
        users: "Пользователи",
        images: "Изображения",
        promos: "Промокоды",
        total_users: "Всего пользователей",
        total_images: "Всего изображений",
        credits_used: "Потрачено кредитов",
        active_users: "Активны за неделю",
        active: "активен",
        inactive: "отключен",
        loading: "Загрузка...",
    },
    hints: Hints {
        global: "Tab разделы  / поиск  Ctrl+L язык  Ctrl+C выход",
        home: "Enter начать",
        generator: "Вверх/Вниз поле  Влево/Вправо выбор  Enter создать",
        gallery: "Вверх/Вниз выбор  f избранное  s поделиться  r обновить",
        list: "Вверх/Вниз выбор  Enter применить",
        profile_signed_in: "o выйти",
        profile_signed_out: "l войти  r регистрация",
        admin: "Влево/Вправо вкладка  r обновить  n новый промокод  t вкл/выкл",
        login: "Enter далее  Ctrl+R регистрация  Ctrl+P забыли пароль",
        form: "Вверх/Вниз поле  Пробел отметить  Enter далее  Esc назад",
        search: "Введите запрос  Вверх/Вниз выбор  Enter открыть  Esc закрыть",
    },
    share_text: "Создано в PhotoSet AI: {prompt}",
};
