use egui::{menu, RichText, Ui};
use egui_phosphor::regular as icons;
use gantt_planner::io::LoadMode;

use crate::app::GanttApp;
use crate::ui::dialogs::Dialog;
use crate::ui::theme;

/// Render the top toolbar / menu bar.
pub fn show_toolbar(app: &mut GanttApp, ui: &mut Ui) {
    menu::bar(ui, |ui| {
        ui.menu_button(RichText::new("  File  ").font(theme::font_menu()), |ui| {
            if ui.button(format!("{}  New Workspace", icons::FILE_PLUS)).clicked() {
                app.dialog = Some(Dialog::confirm_new_workspace());
                ui.close_menu();
            }
            if ui.button(format!("{}  Open...", icons::FOLDER_OPEN)).clicked() {
                app.open_file(LoadMode::ReplaceAll);
                ui.close_menu();
            }
            if ui.button("  Open and Append Projects...").clicked() {
                app.open_file(LoadMode::Append);
                ui.close_menu();
            }
            if ui.button("  Open into Current Project...").clicked() {
                app.open_file(LoadMode::IntoActive);
                ui.close_menu();
            }
            ui.separator();
            if ui.button(format!("{}  Save          Ctrl+S", icons::FLOPPY_DISK)).clicked() {
                app.save();
                ui.close_menu();
            }
            if ui.button("  Save As...").clicked() {
                app.save_as();
                ui.close_menu();
            }
            ui.separator();
            if ui.button(format!("{}  Import CSV...", icons::FILE_CSV)).clicked() {
                app.import_csv();
                ui.close_menu();
            }
            if ui.button("  Export CSV...").clicked() {
                app.export_csv();
                ui.close_menu();
            }
            ui.separator();
            if ui.button(format!("{}  Open Data Folder", icons::FOLDER)).clicked() {
                app.reveal_data_folder();
                ui.close_menu();
            }
        });

        ui.menu_button(RichText::new("  Project  ").font(theme::font_menu()), |ui| {
            if ui.button(format!("{}  Add Task...", icons::PLUS)).clicked() {
                app.open_add_task(None);
                ui.close_menu();
            }
            if ui.button(format!("{}  Add Milestone...", icons::DIAMOND)).clicked() {
                app.open_add_milestone();
                ui.close_menu();
            }
            ui.separator();
            if ui.button("  New Project").clicked() {
                app.add_project();
                ui.close_menu();
            }
            if ui.button("  Rename Project...").clicked() {
                let index = app.workspace.active_index();
                app.dialog = Some(Dialog::rename_project(index, &app.workspace.active().name));
                ui.close_menu();
            }
            if ui.button(format!("{}  Duplicate Project", icons::COPY)).clicked() {
                app.duplicate_project(app.workspace.active_index());
                ui.close_menu();
            }
            if ui.button(format!("{}  Delete Project...", icons::TRASH)).clicked() {
                app.dialog = Some(Dialog::confirm_delete_project(
                    app.workspace.active_index(),
                    &app.workspace.active().name,
                ));
                ui.close_menu();
            }
        });

        ui.menu_button(RichText::new("  View  ").font(theme::font_menu()), |ui| {
            if ui.button("  Expand / Collapse All Groups").clicked() {
                app.toggle_all_groups();
                ui.close_menu();
            }
            ui.separator();
            if ui
                .checkbox(&mut app.settings.autosave_enabled, "Autosave")
                .changed()
            {
                app.save_settings();
            }
        });

        ui.menu_button(RichText::new("  Help  ").font(theme::font_menu()), |ui| {
            if ui.button("CSV Format").clicked() {
                app.dialog = Some(Dialog::CsvHelp);
                ui.close_menu();
            }
            if ui.button("About").clicked() {
                app.dialog = Some(Dialog::About);
                ui.close_menu();
            }
        });

        // Right-aligned file name
        ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
            let name = app
                .file_path
                .as_deref()
                .and_then(|p| p.file_name())
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| "Untitled".to_string());
            let modified = if app.dirty { " •" } else { "" };
            ui.label(RichText::new(format!("{name}{modified}")).size(11.0).weak());
        });
    });
}

/// One tab per project; the active one highlighted. Double-click renames.
pub fn show_project_tabs(app: &mut GanttApp, ui: &mut Ui) {
    ui.horizontal(|ui| {
        ui.spacing_mut().item_spacing.x = 2.0;
        let active = app.workspace.active_index();
        let mut switch_to = None;
        let mut rename = None;
        for (index, project) in app.workspace.projects().iter().enumerate() {
            let text = RichText::new(&project.name).size(12.0).color(if index == active {
                theme::TEXT_PRIMARY
            } else {
                theme::TEXT_SECONDARY
            });
            let tab = ui.selectable_label(index == active, text);
            if tab.double_clicked() {
                rename = Some((index, project.name.clone()));
            } else if tab.clicked() && index != active {
                switch_to = Some(index);
            }
        }
        if ui
            .button(RichText::new(icons::PLUS).color(theme::TEXT_SECONDARY))
            .on_hover_text("New project")
            .clicked()
        {
            app.add_project();
        }

        if let Some(index) = switch_to {
            app.switch_project(index);
        }
        if let Some((index, name)) = rename {
            app.dialog = Some(Dialog::rename_project(index, &name));
        }
    });
}
