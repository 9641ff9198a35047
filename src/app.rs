use gtk4::prelude::*;
use gtk4::Application;

use crate::config::GalleryConfig;
use crate::ui::MainWindow;

const APP_ID: &str = "org.folio.Gallery";

pub struct FolioApp {
    app: Application,
}

impl FolioApp {
    pub fn new(config: GalleryConfig) -> Self {
        let app = Application::builder()
            .application_id(APP_ID)
            .flags(gio::ApplicationFlags::NON_UNIQUE)
            .build();

        app.connect_activate(move |app| Self::on_activate(app, &config));

        Self { app }
    }

    /// Run the GTK main loop. Arguments were already parsed by the CLI.
    pub fn run(&self) -> i32 {
        self.app.run_with_args::<&str>(&[]).into()
    }

    fn on_activate(app: &Application, config: &GalleryConfig) {
        let window = MainWindow::new(app, config.clone());
        window.present();
        // Keep the window alive by storing it on the Application.
        unsafe {
            app.set_data("main-window", window);
        }
    }
}
