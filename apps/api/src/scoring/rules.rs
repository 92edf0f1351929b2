//! Fixed keyword tables driving the heuristic scores.
//!
//! These are data, not logic. Keyword sets are matched with
//! [`contains_any`](super::contains_any), so a short skill token such as `c`
//! matches every keyword that contains it.

// ────────────────────────────────────────────────────────────────────────────
// Experience: employer tiers
// ────────────────────────────────────────────────────────────────────────────

pub const TIER_A_EMPLOYERS: &[&str] = &["谷歌", "google"];

pub const TIER_B_EMPLOYERS: &[&str] = &[
    "阿里", "腾讯", "百度", "字节跳动", "甲骨文", "alibaba", "tencent", "baidu", "bytedance",
    "oracle",
];

pub const TIER_C_EMPLOYERS: &[&str] = &[
    "华为", "中兴", "小米", "oppo", "vivo", "realme", "思杰", "二十八", "十四", "京东", "哔哩哔哩",
    "huawei", "zte", "xiaomi", "citrix", "bilibili",
];

pub const TIER_A_LEVEL: f64 = 8.0;
pub const TIER_B_LEVEL: f64 = 7.0;
pub const TIER_C_LEVEL: f64 = 5.5;
pub const EXPERIENCE_BASE: f64 = 5.0;

/// Each threshold reached adds [`TENURE_BONUS`].
pub const TENURE_THRESHOLDS: &[i32] = &[2, 5, 7, 10];
pub const TENURE_BONUS: f64 = 0.5;

// ────────────────────────────────────────────────────────────────────────────
// Education
// ────────────────────────────────────────────────────────────────────────────

pub const TECHNICAL_MAJORS: &[&str] = &[
    "软件",
    "计算机",
    "物联网",
    "人工智能",
    "大数据",
    "云计算",
    "嵌入式",
    "电子信息",
    "software",
    "computer",
    "internet of things",
    "artificial intelligence",
    "big data",
    "cloud computing",
    "embedded",
    "electronic information",
];

pub const TECHNICAL_MAJOR_BONUS: f64 = 1.0;
pub const MASTER_BONUS: f64 = 1.0;
pub const DOCTORATE_BONUS: f64 = 2.0;

// ────────────────────────────────────────────────────────────────────────────
// Technical: per-position rule sets
// ────────────────────────────────────────────────────────────────────────────

pub const TECHNICAL_BASE: f64 = 5.0;
pub const BLOG_BONUS: f64 = 1.0;
pub const GITHUB_BONUS: f64 = 0.5;
/// Technical score for algorithm candidates without Python. With Python they
/// get the base score and link bonuses only; there is no algorithm skill table.
pub const ALGORITHM_WITHOUT_PYTHON: f64 = 0.1;

/// A rule fires when the candidate's skills match any keyword in the set.
/// `required` rules fire on a miss instead.
#[derive(Debug, Clone, Copy)]
pub struct SkillRule {
    pub keywords: &'static [&'static str],
    pub points: f64,
    pub required: bool,
}

const fn bonus(keywords: &'static [&'static str], points: f64) -> SkillRule {
    SkillRule {
        keywords,
        points,
        required: false,
    }
}

const fn penalty_unless(keywords: &'static [&'static str], points: f64) -> SkillRule {
    SkillRule {
        keywords,
        points: -points,
        required: true,
    }
}

pub const BACKEND_RULES: &[SkillRule] = &[
    penalty_unless(&["python"], 2.0),
    penalty_unless(
        &["大模型", "ollama", "vllm", "transformer", "pytorch", "numpy", "langchain"],
        2.0,
    ),
    bonus(&["大模型微调"], 0.5),
    bonus(&["rust"], 0.5),
    bonus(&["kubernetes", "k8s"], 0.5),
    bonus(&["docker"], 0.5),
    bonus(&["es", "elasticsearch", "elk"], 0.5),
    bonus(&["transformer", "numpy", "pytorch"], 0.5),
    bonus(&["javascript", "js", "angular", "vue", "react", "nodejs"], 0.2),
    bonus(&["mysql", "postgresql", "sql", "tidb"], 0.2),
    bonus(&["设计模式"], 0.2),
];

/// Back-end stack breadth: each keyword is checked on its own and worth 0.1.
pub const BACKEND_BREADTH: &[&str] = &[
    "java",
    "go",
    "c",
    "c++",
    "nosql",
    "redis",
    "mongodb",
    "prometheus",
    "ollama",
    "vllm",
    "fastapi",
    "kafka",
    "rabbitmq",
    "zookeeper",
    "rocketmq",
    "pulsar",
    "minio",
    "etcd",
    "langchain",
];
pub const BACKEND_BREADTH_BONUS: f64 = 0.1;

pub const FRONTEND_RULES: &[SkillRule] = &[
    bonus(&["vue3"], 1.0),
    bonus(&["react"], 0.5),
    bonus(&["angular"], 0.5),
    bonus(&["vite"], 1.0),
    bonus(&["git"], 1.0),
    bonus(&["typescript", "ts"], 1.0),
];

pub const OPERATIONS_RULES: &[SkillRule] = &[
    penalty_unless(&["docker"], 2.0),
    bonus(&["大模型"], 1.0),
    bonus(&["kubernetes", "k8s"], 1.0),
    bonus(&["shell"], 1.0),
    bonus(&["arm64"], 1.0),
    bonus(
        &["mysql", "redis", "postgresql", "mongodb", "elasticsearch", "es", "prometheus"],
        1.0,
    ),
    bonus(&["python"], 1.0),
    bonus(&["c", "java", "python", "go", "rust"], 0.5),
];

pub const EMBEDDED_RULES: &[SkillRule] = &[
    bonus(&["c", "c++"], 1.0),
    bonus(&["arm", "stm32", "esp32", "esp8266", "bsp"], 1.0),
    bonus(&["ai"], 1.0),
    bonus(&["transformer", "embedding"], 1.0),
    bonus(&["昇腾", "寒武纪"], 1.0),
    bonus(&["量化"], 1.0),
    bonus(&["移植"], 1.0),
];
