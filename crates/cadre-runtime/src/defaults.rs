//! Default-value sources: environment variables and app settings.
//!
//! Sources are consulted in registration order, only for arguments that
//! received no explicit input, before value binding. The first source that
//! resolves an argument wins.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tracing::debug;

use cadre_core::{InputSource, InputValue};
use cadre_framework::{CommandContext, Middleware, Next, PipelineResult, exit_code};

/// Supplies default input values for arguments with no explicit input.
pub trait DefaultValueSource: Send + Sync {
    fn name(&self) -> &str;

    /// The [`InputSource`] recorded on values this source supplies.
    fn input_source(&self) -> InputSource;

    /// Resolves values for `argument` on `command` (the command's own name).
    fn resolve(&self, command: &str, argument: &str) -> Option<Vec<String>>;
}

/// Reads `PREFIX_ARGUMENT` environment variables (upper-cased, `-` mapped
/// to `_`).
pub struct EnvVarDefaults {
    prefix: String,
}

impl EnvVarDefaults {
    pub fn with_prefix(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }

    fn key(&self, argument: &str) -> String {
        format!("{}_{}", self.prefix, argument)
            .to_uppercase()
            .replace('-', "_")
    }
}

impl DefaultValueSource for EnvVarDefaults {
    fn name(&self) -> &str {
        "env-var"
    }

    fn input_source(&self) -> InputSource {
        InputSource::EnvVar
    }

    fn resolve(&self, _command: &str, argument: &str) -> Option<Vec<String>> {
        std::env::var(self.key(argument)).ok().map(|v| vec![v])
    }
}

/// Looks values up in an explicit key/value map: `command.argument` first,
/// then the bare argument name.
pub struct AppSettingDefaults {
    values: HashMap<String, String>,
}

impl AppSettingDefaults {
    pub fn new(values: HashMap<String, String>) -> Self {
        Self { values }
    }
}

impl DefaultValueSource for AppSettingDefaults {
    fn name(&self) -> &str {
        "app-setting"
    }

    fn input_source(&self) -> InputSource {
        InputSource::AppSetting
    }

    fn resolve(&self, command: &str, argument: &str) -> Option<Vec<String>> {
        self.values
            .get(&format!("{command}.{argument}"))
            .or_else(|| self.values.get(argument))
            .map(|v| vec![v.clone()])
    }
}

/// Post-parse middleware applying default-value sources to the target
/// command's path.
pub struct DefaultValueSourcesMiddleware {
    sources: Vec<Arc<dyn DefaultValueSource>>,
}

impl DefaultValueSourcesMiddleware {
    pub fn new(sources: Vec<Arc<dyn DefaultValueSource>>) -> Self {
        Self { sources }
    }
}

#[async_trait]
impl Middleware for DefaultValueSourcesMiddleware {
    fn name(&self) -> &str {
        "default-value-sources"
    }

    async fn handle(&self, ctx: Arc<CommandContext>, next: Next) -> PipelineResult {
        if ctx.is_cancellation_requested() {
            return Ok(exit_code::ERROR);
        }
        let Some(target) = ctx.target_command() else {
            return next.run(ctx).await;
        };

        ctx.with_tree_mut(|tree| {
            for id in tree.path_to(target) {
                let command_name = tree.get(id).name().to_string();

                for index in 0..tree.get(id).options().len() {
                    let option = tree.option(id, index);
                    // A default cannot set a flag, and explicit input wins.
                    if option.is_flag() || !option.input_values().is_empty() {
                        continue;
                    }
                    let name = option.name();
                    if let Some((values, source, source_name)) =
                        self.first_match(&command_name, &name)
                    {
                        debug!(argument = %name, source = source_name, "applying default values");
                        for value in values {
                            tree.option_mut(id, index).push_input(InputValue::new(value, source));
                        }
                    }
                }

                for index in 0..tree.get(id).operands().len() {
                    let operand = tree.operand(id, index);
                    if !operand.input_values().is_empty() {
                        continue;
                    }
                    let name = operand.name().to_string();
                    if let Some((values, source, source_name)) =
                        self.first_match(&command_name, &name)
                    {
                        debug!(argument = %name, source = source_name, "applying default values");
                        for value in values {
                            tree.operand_mut(id, index)
                                .push_input(InputValue::new(value, source));
                        }
                    }
                }
            }
        });

        next.run(ctx).await
    }
}

impl DefaultValueSourcesMiddleware {
    fn first_match(
        &self,
        command: &str,
        argument: &str,
    ) -> Option<(Vec<String>, InputSource, &str)> {
        self.sources.iter().find_map(|source| {
            source
                .resolve(command, argument)
                .map(|values| (values, source.input_source(), source.name()))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_env_var_key_shape() {
        let source = EnvVarDefaults::with_prefix("myapp");
        assert_eq!(source.key("dry-run"), "MYAPP_DRY_RUN");
    }

    #[test]
    fn test_app_setting_scoped_key_wins() {
        let mut values = HashMap::new();
        values.insert("deploy.target".to_string(), "prod".to_string());
        values.insert("target".to_string(), "dev".to_string());
        let source = AppSettingDefaults::new(values);

        assert_eq!(source.resolve("deploy", "target"), Some(vec!["prod".into()]));
        assert_eq!(source.resolve("other", "target"), Some(vec!["dev".into()]));
        assert_eq!(source.resolve("other", "missing"), None);
    }
}
