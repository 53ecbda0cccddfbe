//! Templates shipped with the binary.

use super::store::{TemplateOrigin, TemplateStore, TemplateSummary};
use super::{Section, SectionKind, Template};
use crate::error::PipelineError;

fn bullets(items: &[&str]) -> Vec<String> {
    items.iter().map(|item| item.to_string()).collect()
}

fn annual_work_summary() -> Template {
    Template::new(
        "annual_work_summary",
        "年度工作总结",
        vec![
            Section::new("overview", "年度工作概述")
                .with_word_count(300)
                .with_guidance("概述本年度的整体工作情况、主要职责和总体成效")
                .with_keywords(["概述", "整体", "职责", "年度"]),
            Section::new("achievements", "主要工作成果")
                .with_kind(SectionKind::Nested)
                .with_guidance("分条目总结本年度取得的主要成果，尽量引用具体数据")
                .with_keywords(["成果", "完成", "业绩"])
                .with_subsections(vec![
                    Section::new("achievement_projects", "重点项目完成情况")
                        .with_word_count(400)
                        .with_keywords(["项目", "上线", "交付", "里程碑"]),
                    Section::new("achievement_metrics", "关键指标达成")
                        .with_word_count(300)
                        .with_keywords(["指标", "数据", "增长", "图表", "同比"]),
                    Section::new("achievement_innovation", "创新与改进")
                        .with_word_count(300)
                        .with_keywords(["创新", "改进", "优化", "流程"]),
                ]),
            Section::new("experience", "经验与体会")
                .with_word_count(300)
                .with_guidance("提炼工作中的有效方法和心得")
                .with_keywords(["经验", "体会", "方法"]),
            Section::new("problems", "存在的问题与不足")
                .with_kind(SectionKind::List)
                .with_guidance("客观指出工作中存在的问题")
                .with_keywords(["问题", "不足", "风险"])
                .with_bullets(bullets(&["工作方法", "专业能力", "协作沟通"])),
            Section::new("next_year_goals", "下一年度工作计划")
                .with_word_count(400)
                .with_guidance("提出可衡量的下一年度目标和措施")
                .with_keywords(["计划", "目标", "明年", "措施"]),
            Section::new("conclusion", "结语")
                .with_word_count(150)
                .with_keywords(["总结", "展望"]),
            Section::new("appendix", "附录")
                .with_kind(SectionKind::Optional)
                .with_guidance("补充数据表、图片等支撑材料")
                .with_keywords(["附件", "附录", "图片", "表格"])
                .optional(),
        ],
    )
    .with_category("工作总结")
    .with_description("按成果、经验、问题和计划组织的年度工作总结")
}

fn meeting_minutes() -> Template {
    Template::new(
        "meeting_minutes",
        "会议纪要",
        vec![
            Section::new("basic_info", "会议基本信息")
                .with_kind(SectionKind::Table)
                .with_placeholder("会议时间：\n会议地点：\n主持人：\n参会人员：")
                .with_keywords(["时间", "地点", "主持", "参会"]),
            Section::new("agenda", "会议议题")
                .with_kind(SectionKind::List)
                .with_keywords(["议题", "议程"])
                .with_bullets(bullets(&["议题一", "议题二"])),
            Section::new("discussion", "讨论内容")
                .with_word_count(600)
                .with_guidance("按议题记录主要发言和讨论要点")
                .with_keywords(["讨论", "发言", "意见"]),
            Section::new("decisions", "会议决议")
                .with_kind(SectionKind::List)
                .with_keywords(["决议", "决定", "通过"])
                .with_bullets(bullets(&["决议事项"])),
            Section::new("action_items", "后续工作安排")
                .with_kind(SectionKind::Table)
                .with_placeholder("事项 | 负责人 | 完成时间")
                .with_keywords(["负责人", "安排", "截止"]),
        ],
    )
    .with_category("会议")
    .with_description("记录议题、讨论、决议和后续安排的会议纪要")
}

fn project_summary_report() -> Template {
    Template::new(
        "project_summary_report",
        "项目总结报告",
        vec![
            Section::new("background", "项目背景")
                .with_word_count(300)
                .with_keywords(["背景", "起因", "需求"]),
            Section::new("objectives", "项目目标")
                .with_word_count(200)
                .with_keywords(["目标", "范围"]),
            Section::new("implementation", "实施过程")
                .with_kind(SectionKind::Nested)
                .with_word_count(900)
                .with_keywords(["实施", "过程", "阶段"])
                .with_subsections(vec![
                    Section::new("phase_planning", "规划阶段")
                        .with_word_count(300)
                        .with_keywords(["规划", "设计", "方案"]),
                    Section::new("phase_execution", "执行阶段")
                        .with_word_count(300)
                        .with_keywords(["开发", "执行", "测试", "架构"]),
                    Section::new("phase_delivery", "交付阶段")
                        .with_word_count(300)
                        .with_keywords(["交付", "上线", "验收"]),
                ]),
            Section::new("results", "项目成果")
                .with_word_count(400)
                .with_guidance("用数据说明项目取得的成果和收益")
                .with_keywords(["成果", "收益", "效果", "数据"]),
            Section::new("lessons", "经验教训")
                .with_word_count(300)
                .with_keywords(["经验", "教训", "问题"]),
            Section::new("recommendations", "后续建议")
                .with_word_count(200)
                .with_keywords(["建议", "后续", "改进"]),
        ],
    )
    .with_category("项目")
    .with_description("覆盖背景、目标、实施、成果和经验教训的项目总结")
}

fn weekly_report() -> Template {
    Template::new(
        "weekly_report",
        "工作周报",
        vec![
            Section::new("completed", "本周完成工作")
                .with_kind(SectionKind::List)
                .with_keywords(["完成", "本周"])
                .with_bullets(bullets(&["主要任务", "完成情况"])),
            Section::new("in_progress", "进行中事项")
                .with_word_count(200)
                .with_keywords(["进行", "进度"]),
            Section::new("issues", "问题与风险")
                .with_word_count(200)
                .with_keywords(["问题", "风险", "阻塞"]),
            Section::new("next_week", "下周计划")
                .with_kind(SectionKind::List)
                .with_keywords(["下周", "计划"])
                .with_bullets(bullets(&["计划任务"])),
        ],
    )
    .with_category("工作总结")
    .with_description("简短的每周进展汇报")
}

pub struct BuiltinTemplates {
    templates: Vec<Template>,
}

impl BuiltinTemplates {
    pub fn new() -> Self {
        Self {
            templates: vec![
                annual_work_summary(),
                meeting_minutes(),
                project_summary_report(),
                weekly_report(),
            ],
        }
    }

    pub fn templates(&self) -> &[Template] {
        &self.templates
    }
}

impl Default for BuiltinTemplates {
    fn default() -> Self {
        Self::new()
    }
}

impl TemplateStore for BuiltinTemplates {
    fn get(&self, template_id: &str) -> Result<Option<Template>, PipelineError> {
        Ok(self
            .templates
            .iter()
            .find(|template| template.id == template_id)
            .cloned())
    }

    fn list(&self) -> Result<Vec<TemplateSummary>, PipelineError> {
        Ok(self
            .templates
            .iter()
            .map(|template| TemplateSummary::of(template, TemplateOrigin::Builtin))
            .collect())
    }
}
