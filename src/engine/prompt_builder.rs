use crate::model::level::LevelData;

/// Builds the prompts sent to the generative service.
/// Only formats text: no parsing, no networking, no engine logic.
pub struct PromptBuilder;

impl PromptBuilder {
    pub fn level(level: u32, defeated: &[String]) -> String {
        let mut prompt = String::new();

        push_host_role(&mut prompt);
        push_level_task(&mut prompt, level);
        push_defeated_hint(&mut prompt, defeated);
        push_level_requirements(&mut prompt);
        prompt.push_str("请仅以JSON格式输出，不要包含Markdown代码块标记。\n");

        prompt
    }

    pub fn validation(level: &LevelData, chosen: &str) -> String {
        let mut prompt = String::new();

        prompt.push_str("语境：西游记游戏。\n");
        push_scene(&mut prompt, level);
        prompt.push_str(&format!("用户选择：{chosen}\n"));
        if let Some(correct) = level.correct_choice() {
            prompt.push_str(&format!("正确答案：{}\n", correct.name));
        }
        prompt.push('\n');
        push_judging_rules(&mut prompt);
        prompt.push_str("以JSON格式输出。\n");

        prompt
    }

    pub fn monster_image(level: &LevelData) -> String {
        format!(
            "Chinese mythology monster, {}, {}. Digital art, realistic, hyper-detailed, \
             dark fantasy style, cinematic lighting.",
            level.enemy_name, level.enemy_description
        )
    }
}

/* =========================
   Level generation
   ========================= */

fn push_host_role(prompt: &mut String) {
    prompt.push_str("你是一个《西游记》文字冒险游戏的主持人。\n");
    prompt.push_str("目标受众：原著专家。\n");
}

fn push_level_task(prompt: &mut String, level: u32) {
    prompt.push_str(&format!(
        "任务：创建一个高难度的关卡（第 {level} 难），涉及原著中的一个特定劫难或妖怪。\n"
    ));
}

fn push_defeated_hint(prompt: &mut String, defeated: &[String]) {
    if defeated.is_empty() {
        return;
    }
    prompt.push_str(&format!(
        "请避免出现以下已击败的妖怪: {}.\n",
        defeated.join(", ")
    ));
}

fn push_level_requirements(prompt: &mut String) {
    let rules = [
        "选择一个特定的妖怪或危机（例如：红孩儿、独角兕大王、琵琶精、铁扇公主、黄眉老祖等）。",
        "'story'（故事背景）应该生动地描述危机（例如：悟空被困，或师父被抓）。必须使用简体中文。",
        "'artifacts'（道具）：提供4个道具。恰好有一个是原著中正确的解法（例如：针对火焰山使用'芭蕉扇'）；\
         其他3个必须是西游宇宙中看似合理但在此情境下错误的道具（例如：用'定风丹'去对付火）。",
        "难度：困难。允许使用冷门法宝或细节。",
        "所有输出必须为简体中文。",
    ];

    prompt.push_str("\n要求：\n");
    for (i, rule) in rules.iter().enumerate() {
        prompt.push_str(&format!("{}. {}\n", i + 1, rule));
    }
    prompt.push('\n');
}

/* =========================
   Validation
   ========================= */

fn push_scene(prompt: &mut String, level: &LevelData) {
    prompt.push_str(&format!("场景：{}\n", level.story));
    prompt.push_str(&format!("妖怪：{}\n", level.enemy_name));
}

fn push_judging_rules(prompt: &mut String) {
    prompt.push_str("任务：叙述结果。\n");
    prompt.push_str("1. 如果选择匹配正确答案（或在原著逻辑中合理），则为成功（SUCCESS）。\n");
    prompt.push_str(
        "2. 如果不匹配，则为失败（FAILURE）。请根据原著设定解释原因\
         （例如：“紫金红葫芦需要叫名字才行”，“定风丹不能灭火”）。\n",
    );
    prompt.push_str("3. 语言：简体中文。语气：史诗感，像说书人。\n\n");
}
