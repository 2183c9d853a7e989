use repbook_domain::{
    CreateError, DeleteError, ReadError, TemplateID, TemplateService, WorkoutTemplate,
};

use crate::speculative;

/// Template list with optimistically applied mutations.
#[derive(Default)]
pub struct TemplateList {
    templates: Vec<WorkoutTemplate>,
}

impl TemplateList {
    #[must_use]
    pub fn new(templates: Vec<WorkoutTemplate>) -> Self {
        Self { templates }
    }

    #[must_use]
    pub fn templates(&self) -> &[WorkoutTemplate] {
        &self.templates
    }

    pub async fn refresh(&mut self, service: &impl TemplateService) -> Result<(), ReadError> {
        self.templates = service.get_templates().await?;
        Ok(())
    }

    pub async fn delete(
        &mut self,
        service: &impl TemplateService,
        id: TemplateID,
    ) -> Result<TemplateID, DeleteError> {
        let remaining = self
            .templates
            .iter()
            .filter(|t| t.id != id)
            .cloned()
            .collect();

        speculative::apply(&mut self.templates, remaining, service.delete_template(id)).await
    }

    pub async fn duplicate(
        &mut self,
        service: &impl TemplateService,
        id: TemplateID,
    ) -> Result<(), CreateError> {
        let Some(source) = self.templates.iter().find(|t| t.id == id).cloned() else {
            return Err(CreateError::Other("template not found".into()));
        };

        // placeholder entry with a nil ID until the storage assigned one
        let mut with_copy = self.templates.clone();
        with_copy.push(WorkoutTemplate {
            id: TemplateID::nil(),
            name: source.copy_name().unwrap_or_else(|_| source.name.clone()),
            notes: source.notes.clone(),
            exercises: source.exercises.clone(),
        });

        let created = speculative::apply(
            &mut self.templates,
            with_copy,
            service.duplicate_template(id),
        )
        .await?;

        if let Some(entry) = self.templates.iter_mut().find(|t| t.id.is_nil()) {
            *entry = created;
        }

        Ok(())
    }
}
